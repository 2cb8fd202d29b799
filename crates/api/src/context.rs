use nexium_core::Actor;

/// Who is acting on this request, taken from the `X-Actor` header.
///
/// Always present on API routes; requests without the header act as
/// [`Actor::system`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor.clone()
    }
}
