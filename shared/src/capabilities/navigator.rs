use crux_core::capability::{CapabilityContext, Operation};
use crux_core::macros::Capability;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum NavigationOperation {
    Navigate(Route),
}

impl Operation for NavigationOperation {
    type Output = ();
}

/// Fire-and-forget screen navigation handled by the shell's navigator.
#[derive(Capability)]
pub struct Navigator<Ev> {
    context: CapabilityContext<NavigationOperation, Ev>,
}

impl<Ev> Navigator<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<NavigationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn navigate(&self, route: Route) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .notify_shell(NavigationOperation::Navigate(route))
                .await;
        });
    }
}
