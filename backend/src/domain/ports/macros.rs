//! `define_port_error!` generates a `thiserror` enum plus one snake_case
//! constructor per variant. String-like fields accept `impl Into<T>`.

macro_rules! define_port_error {
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
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            #[doc = "Build the `" $variant "` variant."]
            #[must_use]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            #[doc = "Build the `" $variant "` variant."]
            #[must_use]
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;
