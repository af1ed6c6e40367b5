mod rate_gate;

pub use rate_gate::*;

/// Declares an event whose metric handles are registered once, at
/// `register()`, and then updated on every `emit`.
#[macro_export]
macro_rules! registered_event {
    (
        $event:ident => {
            $($field:ident: $type:ty = $value:expr,)*
        }

        fn emit(&$slf:ident, $data_name:ident: $data:ty)
        $emit_body:block
    ) => {
        #[derive(Clone)]
        pub struct $event {
            $($field: $type,)*
        }

        impl $event {
            pub fn register() -> Self {
                Self {
                    $($field: $value,)*
                }
            }

            pub fn emit(&$slf, $data_name: $data)
            $emit_body
        }
    };
}
