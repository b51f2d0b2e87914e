//! Macros for ergonomic machine construction.

/// Generate a state id enum and its `State` implementation.
///
/// # Example
///
/// ```
/// use keystate::core::State;
/// use keystate::state_enum;
///
/// state_enum! {
///     pub enum Upload {
///         Idle,
///         Sending,
///         Finished,
///     }
///     final: [Finished]
/// }
///
/// assert_eq!(Upload::Sending.name(), "Sending");
/// assert!(Upload::Finished.is_final());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }

            #[allow(unreachable_patterns)]
            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }
        }
    };
}
