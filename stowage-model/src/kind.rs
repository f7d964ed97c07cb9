use crate::TypeDescriptor;
use stowage_types::TypeKey;

/// Binds a Rust type to the [`TypeKey`] it is registered under.
///
/// Used by the generic lookup variants (`get_object::<T>()`), which match
/// the key and everything registered as deriving from or implementing it.
pub trait SubObjectKind {
    const TYPE_KEY: &'static str;

    fn type_key() -> TypeKey {
        TypeKey::from_static(Self::TYPE_KEY)
    }

    /// A starting descriptor for registering this type as a concrete
    /// sub-object. Override to declare parents, toggles or menu entries.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::sub_object(Self::type_key())
    }
}
