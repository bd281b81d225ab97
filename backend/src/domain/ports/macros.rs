//! `define_port_error!`: error enums for the outbound ports.
//!
//! Each port (user and contact repositories, cache, mailer, avatar store,
//! rate limiter) declares its failures as a `thiserror` enum plus one
//! snake-case constructor per variant. String fields take `impl Into<String>`
//! so adapters can pass `&str` or owned messages:
//!
//! ```ignore
//! define_port_error! {
//!     pub enum MailerError {
//!         Message { message: String } => "confirmation email could not be built: {message}",
//!         Transport { message: String } => "confirmation email delivery failed: {message}",
//!     }
//! }
//!
//! let err = MailerError::transport("connection reset");
//! ```

macro_rules! define_port_error {
    // Unit variant: `Duplicate` gives `fn duplicate() -> Self`.
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    // All fields consumed: emit the constructor.
    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    // Peel one field into a parameter and its initialiser.
    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;
