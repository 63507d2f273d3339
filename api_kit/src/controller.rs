use crate::api::Attribute;
use once_cell::sync::Lazy;

/// Action name used when a route points at a controller without naming a method.
pub const INVOKE_ACTION: &str = "invoke";

/// Statically declared description of a controller and its actions.
///
/// Instances are emitted by `#[api_controller]` and collected through
/// `inventory`, replacing any runtime inspection of handler signatures.
#[derive(Debug)]
pub struct ControllerMetadata {
    pub name: &'static str,
    pub actions: &'static [ActionMetadata],
}
inventory::collect!(ControllerMetadata);

impl ControllerMetadata {
    pub fn action(&self, name: &str) -> Option<&'static ActionMetadata> {
        self.actions.iter().find(|action| action.name == name)
    }
}

#[derive(Debug)]
pub struct ActionMetadata {
    pub name: &'static str,
    pub attributes: &'static [Attribute],
}

/// Implemented by `#[api_controller]` so typed handler references can name
/// their controller.
pub trait Controller {
    const NAME: &'static str;
}

static GLOBAL: Lazy<ControllerRegistry> = Lazy::new(ControllerRegistry::from_inventory);

/// The set of controllers handler references are resolved against.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: Vec<&'static ControllerMetadata>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every controller linked into the binary.
    pub fn global() -> &'static ControllerRegistry {
        &GLOBAL
    }

    pub fn from_inventory() -> Self {
        inventory::iter::<ControllerMetadata>
            .into_iter()
            .fold(Self::new(), |registry, controller| registry.register(controller))
    }

    pub fn register(mut self, controller: &'static ControllerMetadata) -> Self {
        if self.get(controller.name).is_none() {
            tracing::debug!(controller = controller.name, "registered controller");
            self.controllers.push(controller);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&'static ControllerMetadata> {
        self.controllers.iter().copied().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ControllerMetadata> + '_ {
        self.controllers.iter().copied()
    }
}
