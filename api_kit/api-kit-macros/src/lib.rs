extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, spanned::Spanned, Attribute, Error, ImplItem, ItemImpl, LitInt, LitStr,
    Result, Type, Visibility,
};

/// Declares the public methods of an `impl` block as controller actions.
///
/// The macro:
/// 1.  Strips the `#[api(...)]` helper attributes from the methods.
/// 2.  Implements `api_kit::Controller` for the type.
/// 3.  Emits a static `api_kit::ControllerMetadata` table and submits it to
///     `inventory`, so routes can be described without inspecting the code at
///     runtime.
///
/// ```ignore
/// #[api_controller]
/// impl PetController {
///     /// Returns a single pet
///     #[api(tag = "pet", outgoing(status = 200, schema = "Pet"))]
///     pub async fn show(Path(id): Path<u64>) -> Json<Pet> { ... }
/// }
/// ```
///
/// Supported keys inside `#[api(...)]`: `operation_id = "..."`,
/// `description = "..."` (defaults to the doc comment), `tag = "..."`
/// (repeatable), `incoming = "Schema"`, `outgoing(status = 200, schema = "Schema")`,
/// `path_param(name = "id", schema = "u64")`,
/// `query_param(name = "limit", schema = "u32", required)` and `deprecated`.
#[proc_macro_attribute]
pub fn api_controller(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return Error::new(
            TokenStream2::from(args).span(),
            "#[api_controller] does not take arguments",
        )
        .to_compile_error()
        .into();
    }

    let item = parse_macro_input!(input as ItemImpl);
    match expand(item) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

/// Submits the `utoipa::ToSchema` of a DTO so generated OpenAPI documents can
/// reference it by name.
///
/// ```ignore
/// #[api_schema]
/// #[derive(Serialize, ToSchema)]
/// pub struct Pet { ... }
/// ```
#[proc_macro_attribute]
pub fn api_schema(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        return Error::new(
            TokenStream2::from(args).span(),
            "#[api_schema] does not take arguments",
        )
        .to_compile_error()
        .into();
    }

    let item = parse_macro_input!(input as syn::DeriveInput);
    if !item.generics.params.is_empty() {
        return Error::new(
            item.generics.span(),
            "#[api_schema] does not support generic types",
        )
        .to_compile_error()
        .into();
    }

    let ident = &item.ident;
    let name = ident.to_string();
    quote! {
        #item

        const _: () = {
            fn schema_provider() -> (
                ::std::string::String,
                ::api_kit::utoipa::openapi::RefOr<::api_kit::utoipa::openapi::Schema>,
            ) {
                (
                    <#ident as ::api_kit::utoipa::ToSchema>::name().into_owned(),
                    <#ident as ::api_kit::utoipa::PartialSchema>::schema(),
                )
            }

            ::api_kit::inventory::submit! {
                ::api_kit::SchemaMetadata {
                    name: #name,
                    schema_provider,
                }
            }
        };
    }
    .into()
}

fn expand(mut item: ItemImpl) -> Result<TokenStream2> {
    if item.trait_.is_some() {
        return Err(Error::new(
            item.span(),
            "#[api_controller] must be placed on an inherent impl block",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "#[api_controller] does not support generic controllers",
        ));
    }

    let self_ty = item.self_ty.clone();
    let controller_name = type_name(&self_ty)?;

    let mut actions = Vec::new();
    for impl_item in item.items.iter_mut() {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };

        let (api_attrs, other_attrs): (Vec<Attribute>, Vec<Attribute>) = method
            .attrs
            .drain(..)
            .partition(|attr| attr.path().is_ident("api"));
        method.attrs = other_attrs;

        if !matches!(method.vis, Visibility::Public(_)) {
            continue;
        }

        let mut attributes = parse_api_attributes(&api_attrs)?;
        let has_description = attributes.iter().any(|a| matches!(a, ApiAttr::Description(_)));
        if !has_description {
            let description = parse_doc_comments(&method.attrs);
            if !description.is_empty() {
                attributes.insert(0, ApiAttr::Description(description));
            }
        }

        actions.push((method.sig.ident.to_string(), attributes));
    }

    let action_count = actions.len();
    let action_tokens = actions.iter().map(|(name, attributes)| {
        let attribute_tokens = attributes.iter().map(ApiAttr::to_tokens);
        quote! {
            ::api_kit::ActionMetadata {
                name: #name,
                attributes: &[ #(#attribute_tokens),* ],
            }
        }
    });

    Ok(quote! {
        #item

        impl ::api_kit::Controller for #self_ty {
            const NAME: &'static str = #controller_name;
        }

        const _: () = {
            static ACTIONS: [::api_kit::ActionMetadata; #action_count] = [ #(#action_tokens),* ];

            ::api_kit::inventory::submit! {
                ::api_kit::ControllerMetadata {
                    name: #controller_name,
                    actions: &ACTIONS,
                }
            }
        };
    })
}

fn type_name(ty: &Type) -> Result<String> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return Ok(segment.ident.to_string());
        }
    }
    Err(Error::new(ty.span(), "expected a named controller type"))
}

enum ApiAttr {
    OperationId(String),
    Description(String),
    Tag(String),
    Incoming(String),
    Outgoing { status: u16, schema: String },
    PathParam { name: String, schema: String },
    QueryParam { name: String, schema: String, required: bool },
    Deprecated,
}

impl ApiAttr {
    fn to_tokens(&self) -> TokenStream2 {
        fn cow(s: &str) -> TokenStream2 {
            quote! { ::std::borrow::Cow::Borrowed(#s) }
        }

        match self {
            ApiAttr::OperationId(id) => {
                let id = cow(id);
                quote! { ::api_kit::Attribute::OperationId(#id) }
            }
            ApiAttr::Description(text) => {
                let text = cow(text);
                quote! { ::api_kit::Attribute::Description(#text) }
            }
            ApiAttr::Tag(tag) => {
                let tag = cow(tag);
                quote! { ::api_kit::Attribute::Tag(#tag) }
            }
            ApiAttr::Incoming(schema) => {
                let schema = cow(schema);
                quote! { ::api_kit::Attribute::Incoming(#schema) }
            }
            ApiAttr::Outgoing { status, schema } => {
                let schema = cow(schema);
                quote! { ::api_kit::Attribute::Outgoing { status: #status, schema: #schema } }
            }
            ApiAttr::PathParam { name, schema } => {
                let (name, schema) = (cow(name), cow(schema));
                quote! { ::api_kit::Attribute::PathParam { name: #name, schema: #schema } }
            }
            ApiAttr::QueryParam {
                name,
                schema,
                required,
            } => {
                let (name, schema) = (cow(name), cow(schema));
                quote! {
                    ::api_kit::Attribute::QueryParam { name: #name, schema: #schema, required: #required }
                }
            }
            ApiAttr::Deprecated => quote! { ::api_kit::Attribute::Deprecated },
        }
    }
}

fn parse_api_attributes(attrs: &[Attribute]) -> Result<Vec<ApiAttr>> {
    let mut result = Vec::new();
    for attr in attrs {
        if matches!(attr.meta, syn::Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let key = meta
                .path
                .get_ident()
                .map(|ident| ident.to_string())
                .unwrap_or_default();

            match key.as_str() {
                "operation_id" => {
                    result.push(ApiAttr::OperationId(meta.value()?.parse::<LitStr>()?.value()))
                }
                "description" => {
                    result.push(ApiAttr::Description(meta.value()?.parse::<LitStr>()?.value()))
                }
                "tag" => result.push(ApiAttr::Tag(meta.value()?.parse::<LitStr>()?.value())),
                "incoming" => {
                    result.push(ApiAttr::Incoming(meta.value()?.parse::<LitStr>()?.value()))
                }
                "deprecated" => result.push(ApiAttr::Deprecated),
                "outgoing" => {
                    let mut status = None;
                    let mut schema = None;
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("status") {
                            status = Some(inner.value()?.parse::<LitInt>()?.base10_parse::<u16>()?);
                        } else if inner.path.is_ident("schema") {
                            schema = Some(inner.value()?.parse::<LitStr>()?.value());
                        } else {
                            return Err(inner.error("expected `status` or `schema`"));
                        }
                        Ok(())
                    })?;
                    match (status, schema) {
                        (Some(status), Some(schema)) => {
                            result.push(ApiAttr::Outgoing { status, schema })
                        }
                        _ => return Err(meta.error("`outgoing` needs `status` and `schema`")),
                    }
                }
                "path_param" | "query_param" => {
                    let mut name = None;
                    let mut schema = None;
                    let mut required = false;
                    meta.parse_nested_meta(|inner| {
                        if inner.path.is_ident("name") {
                            name = Some(inner.value()?.parse::<LitStr>()?.value());
                        } else if inner.path.is_ident("schema") {
                            schema = Some(inner.value()?.parse::<LitStr>()?.value());
                        } else if inner.path.is_ident("required") {
                            required = true;
                        } else {
                            return Err(inner.error("expected `name`, `schema` or `required`"));
                        }
                        Ok(())
                    })?;
                    let (Some(name), Some(schema)) = (name, schema) else {
                        return Err(meta.error("parameters need `name` and `schema`"));
                    };
                    if key == "path_param" {
                        result.push(ApiAttr::PathParam { name, schema });
                    } else {
                        result.push(ApiAttr::QueryParam {
                            name,
                            schema,
                            required,
                        });
                    }
                }
                _ => return Err(meta.error("unsupported #[api] key")),
            }
            Ok(())
        })?;
    }
    Ok(result)
}

/// Joins the doc comments (`///` and `/** ... */`) of a method.
fn parse_doc_comments(attrs: &[Attribute]) -> String {
    let doc_comments: Vec<String> = attrs
        .iter()
        .filter_map(|attr| {
            if attr.path().is_ident("doc") {
                if let syn::Meta::NameValue(nv) = &attr.meta {
                    if let syn::Expr::Lit(expr_lit) = &nv.value {
                        if let syn::Lit::Str(lit) = &expr_lit.lit {
                            return Some(lit.value().trim().to_string());
                        }
                    }
                }
            }
            None
        })
        .collect();

    doc_comments.join("\n").trim().to_string()
}
