//! Computations that can be checkpointed
//!
//! A computation exposes its name, declared parameter names and source text
//! alongside the callable itself. The [`computation!`](crate::computation!)
//! macro derives all of these from a plain `fn` item.

use serde::Serialize;

/// A deterministic computation whose results can be persisted
pub trait Computation {
    /// Arguments of one call; serialized to derive the argument key
    type Args: Serialize;
    /// Value returned on success
    type Output;
    /// Error returned by the computation itself
    type Error;

    /// Name used as the cache directory identifier
    fn name(&self) -> &str;

    /// Declared parameter names, in order
    fn params(&self) -> &[&'static str];

    /// Source text the logic fingerprint is derived from
    fn source(&self) -> &str;

    /// Extension of the audit copy of [`Computation::source`]
    fn source_extension(&self) -> &str {
        "rs"
    }

    /// Run the computation
    fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error>;
}

/// Declare a checkpointable computation from a `fn` item
///
/// Generates a unit struct named after the function implementing
/// [`Computation`]. Arguments are passed as a tuple in declaration order.
/// A function returning `Result<T, E>` surfaces `E` as the computation
/// error; any other return type is infallible. Parameters are plain
/// identifiers, optionally `mut`.
///
/// ```
/// ckpt::computation! {
///     fn add(a: i64, mut b: i64) -> i64 {
///         b += a;
///         b
///     }
/// }
///
/// use ckpt::Computation;
/// assert_eq!(add.call((1, 2)), Ok(3));
/// assert_eq!(add.params(), &["a", "b"]);
/// ```
///
/// Generic functions are rejected: the argument tuple must be one concrete
/// type, so declare one computation per instantiation.
///
/// ```compile_fail
/// ckpt::computation! {
///     fn first<T: Clone>(items: Vec<T>) -> T {
///         items[0].clone()
///     }
/// }
/// ```
///
/// The source text is captured with `stringify!`, whose spacing is not
/// guaranteed to be stable across compiler releases. Fingerprints are
/// computed from parsed tokens, so spacing alone never changes them, but a
/// toolchain that renders the body differently (for example by expanding a
/// nested macro) yields a new cache directory.
#[macro_export]
macro_rules! computation {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident < $($generics:tt)*
    ) => {
        ::std::compile_error!(::std::concat!(
            "computation! cannot declare generic function `",
            ::std::stringify!($name),
            "`; declare one computation per concrete signature"
        ));
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident ( $($params:tt)* ) -> $($signature:tt)*
    ) => {
        $crate::computation!(@params [$(#[$meta])*] [$vis] $name [] [$($params)*] $($signature)*);
    };

    // parameters are normalized to `([mut] name: Type)` one at a time
    (@params $attrs:tt $vis:tt $name:ident [$($done:tt)*] [mut $arg:ident : $ty:ty $(, $($rest:tt)*)?] $($signature:tt)*) => {
        $crate::computation!(@params $attrs $vis $name [$($done)* ([mut] $arg : $ty)] [$($($rest)*)?] $($signature)*);
    };
    (@params $attrs:tt $vis:tt $name:ident [$($done:tt)*] [$arg:ident : $ty:ty $(, $($rest:tt)*)?] $($signature:tt)*) => {
        $crate::computation!(@params $attrs $vis $name [$($done)* ([] $arg : $ty)] [$($($rest)*)?] $($signature)*);
    };

    (
        @params [$(#[$meta:meta])*] [$vis:vis] $name:ident
        [$( ([$($kw:tt)*] $arg:ident : $ty:ty) )*] []
        Result<$ok:ty, $err:ty> $body:block
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::Computation for $name {
            type Args = ($($ty,)*);
            type Output = $ok;
            type Error = $err;

            fn name(&self) -> &str {
                stringify!($name)
            }

            fn params(&self) -> &[&'static str] {
                &[$(stringify!($arg)),*]
            }

            fn source(&self) -> &str {
                stringify!(fn $name($($($kw)* $arg: $ty),*) -> Result<$ok, $err> $body)
            }

            #[allow(unused_variables, clippy::unused_unit)]
            fn call(&self, args: Self::Args) -> ::std::result::Result<$ok, $err> {
                fn __logic($($($kw)* $arg: $ty),*) -> ::std::result::Result<$ok, $err> $body
                let ($($arg,)*) = args;
                __logic($($arg),*)
            }
        }
    };
    (
        @params [$(#[$meta:meta])*] [$vis:vis] $name:ident
        [$( ([$($kw:tt)*] $arg:ident : $ty:ty) )*] []
        $ret:ty $body:block
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::Computation for $name {
            type Args = ($($ty,)*);
            type Output = $ret;
            type Error = ::std::convert::Infallible;

            fn name(&self) -> &str {
                stringify!($name)
            }

            fn params(&self) -> &[&'static str] {
                &[$(stringify!($arg)),*]
            }

            fn source(&self) -> &str {
                stringify!(fn $name($($($kw)* $arg: $ty),*) -> $ret $body)
            }

            #[allow(unused_variables, clippy::unused_unit)]
            fn call(&self, args: Self::Args) -> ::std::result::Result<$ret, ::std::convert::Infallible> {
                fn __logic($($($kw)* $arg: $ty),*) -> $ret $body
                let ($($arg,)*) = args;
                Ok(__logic($($arg),*))
            }
        }
    };
}
