use super::filter::Filter;
use super::parser::{ApiManager, RouteParser};
use super::specification::Specification;
use crate::error::Result;
use crate::routing::RouteCollection;
use std::sync::Arc;

/// Builds the specification of everything reachable from the registered routes.
#[derive(Debug, Clone)]
pub struct RouterScanner<M = RouteParser> {
    routes: Arc<RouteCollection>,
    api_manager: M,
}

impl RouterScanner<RouteParser> {
    pub fn new(routes: Arc<RouteCollection>) -> Self {
        let api_manager = RouteParser::new(routes.clone());
        Self {
            routes,
            api_manager,
        }
    }
}

impl<M: ApiManager> RouterScanner<M> {
    pub fn with_api_manager(routes: Arc<RouteCollection>, api_manager: M) -> Self {
        Self {
            routes,
            api_manager,
        }
    }

    pub fn routes(&self) -> &RouteCollection {
        &self.routes
    }

    /// Describes every controller in turn and merges the results.
    ///
    /// A controller failing with a recoverable error is skipped; earlier
    /// descriptors are never overwritten by later controllers.
    pub fn generate(&self, filter: Option<&dyn Filter>) -> Result<Specification> {
        let mut specification = Specification::new();

        for controller in self.routes.controllers() {
            match self.api_manager.describe(controller, filter) {
                Ok(spec) => specification.merge(spec),
                Err(e) if e.is_recoverable() => {
                    tracing::warn!(controller, error = %e, "skipping controller");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(operations = specification.len(), "scan finished");
        Ok(specification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Descriptor, Method};
    use crate::controller::{ActionMetadata, ControllerMetadata, ControllerRegistry};
    use crate::error::Error;
    use crate::routing::Route;
    use axum::http::Method as HttpMethod;
    use std::cell::RefCell;

    static FIRST: ControllerMetadata = ControllerMetadata {
        name: "First",
        actions: &[ActionMetadata { name: "index", attributes: &[] }],
    };
    static BROKEN: ControllerMetadata = ControllerMetadata {
        name: "Broken",
        actions: &[ActionMetadata { name: "index", attributes: &[] }],
    };
    static LAST: ControllerMetadata = ControllerMetadata {
        name: "Last",
        actions: &[ActionMetadata { name: "index", attributes: &[] }],
    };

    fn routes() -> Arc<RouteCollection> {
        let registry = ControllerRegistry::new()
            .register(&FIRST)
            .register(&BROKEN)
            .register(&LAST);
        let mut routes = RouteCollection::new(registry);
        routes.add(Route::new("/first", vec![HttpMethod::GET], "First@index".into()));
        routes.add(Route::new("/first/again", vec![HttpMethod::GET], "First@index".into()));
        routes.add(Route::new(
            "/broken",
            vec![HttpMethod::GET, HttpMethod::POST],
            "Broken@index".into(),
        ));
        routes.add(Route::new("/last", vec![HttpMethod::DELETE], "Last@index".into()));
        Arc::new(routes)
    }

    #[test]
    fn test_scanner_skips_broken_controller() {
        let spec = RouterScanner::new(routes()).generate(None).unwrap();
        let keys: Vec<String> = spec.iter().map(|d| d.key().to_string()).collect();
        assert_eq!(keys, vec!["GET /first", "DELETE /last"]);
    }

    struct Scripted {
        calls: RefCell<Vec<String>>,
    }

    impl ApiManager for Scripted {
        fn describe(&self, controller: &str, _filter: Option<&dyn Filter>) -> Result<Specification> {
            self.calls.borrow_mut().push(controller.to_string());
            match controller {
                "Broken" => Err(Error::NotDescribable {
                    controller: controller.to_string(),
                    reason: "scripted".to_string(),
                }),
                _ => Ok([Descriptor::new(format!("/{}", controller), Some(Method::Get), vec![]).unwrap()]
                    .into_iter()
                    .collect()),
            }
        }
    }

    #[test]
    fn test_scanner_visits_each_controller_once() {
        let manager = Scripted {
            calls: RefCell::new(Vec::new()),
        };
        let scanner = RouterScanner::with_api_manager(routes(), manager);
        let spec = scanner.generate(None).unwrap();

        assert_eq!(*scanner.api_manager.calls.borrow(), vec!["First", "Broken", "Last"]);
        assert_eq!(spec.len(), 2);
    }

    struct Failing;

    impl ApiManager for Failing {
        fn describe(&self, _controller: &str, _filter: Option<&dyn Filter>) -> Result<Specification> {
            Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "routes unavailable",
            )))
        }
    }

    #[test]
    fn test_scanner_propagates_unexpected_errors() {
        let err = RouterScanner::with_api_manager(routes(), Failing)
            .generate(None)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
