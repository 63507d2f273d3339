use super::builder::DescriptorBuilder;
use super::descriptor::Attribute;
use super::filter::Filter;
use super::specification::Specification;
use crate::error::{Error, Result};
use crate::routing::RouteCollection;
use std::sync::Arc;

/// Produces the partial specification of one controller.
pub trait ApiManager {
    fn describe(&self, controller: &str, filter: Option<&dyn Filter>) -> Result<Specification>;
}

/// Describes controllers from their declared actions and the routes bound to them.
#[derive(Debug, Clone)]
pub struct RouteParser {
    routes: Arc<RouteCollection>,
    builder: DescriptorBuilder,
}

impl RouteParser {
    pub fn new(routes: Arc<RouteCollection>) -> Self {
        Self {
            routes,
            builder: DescriptorBuilder::new(),
        }
    }
}

impl ApiManager for RouteParser {
    fn describe(&self, controller: &str, filter: Option<&dyn Filter>) -> Result<Specification> {
        let metadata = self
            .routes
            .registry()
            .get(controller)
            .ok_or_else(|| Error::not_describable(controller, "controller is not registered"))?;

        let mut spec = Specification::new();
        for action in metadata.actions {
            let Some(route) = self.routes.by_action(metadata.name, action.name) else {
                tracing::debug!(
                    controller = metadata.name,
                    action = action.name,
                    "action has no route, skipping"
                );
                continue;
            };

            let mut declared = Vec::with_capacity(action.attributes.len() + 1);
            let has_operation_id = action
                .attributes
                .iter()
                .any(|attr| matches!(attr, Attribute::OperationId(_)));
            if !has_operation_id {
                declared.push(Attribute::OperationId(
                    format!("{}.{}", metadata.name, action.name).into(),
                ));
            }
            declared.extend_from_slice(action.attributes);

            let descriptor = self.builder.build(route, &declared)?;
            if filter.is_some_and(|f| !f.matches(&descriptor)) {
                continue;
            }
            spec.insert(descriptor);
        }

        if spec.is_empty() {
            return Err(Error::not_describable(controller, "no scannable routes"));
        }
        Ok(spec)
    }
}
