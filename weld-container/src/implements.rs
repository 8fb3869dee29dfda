//! Implementation-to-component conversion.

use std::sync::Arc;

/// States that `Self` can be handed out as `T`.
///
/// Every type implements itself. Trait objects need one line per
/// implementation, written with [`implements!`](crate::implements!).
pub trait Implements<T: ?Sized>: Send + Sync + 'static {
    fn upcast(this: Arc<Self>) -> Arc<T>;
}

impl<T: Send + Sync + 'static> Implements<T> for T {
    #[inline]
    fn upcast(this: Arc<Self>) -> Arc<T> {
        this
    }
}

/// Declares which trait objects an implementation can be bound under.
///
/// # Examples
/// ```
/// use weld_container::implements;
///
/// trait Engine: Send + Sync {
///     fn name(&self) -> &str;
/// }
///
/// struct V8;
/// impl Engine for V8 {
///     fn name(&self) -> &str {
///         "V8"
///     }
/// }
///
/// implements!(V8 => dyn Engine);
/// ```
#[macro_export]
macro_rules! implements {
    ($($implementation:ty => $component:ty),+ $(,)?) => {
        $(
            impl $crate::implements::Implements<$component> for $implementation {
                #[inline]
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$component> {
                    this
                }
            }
        )+
    };
}
