/// Generates inline getter and setter pairs for `Cell` backed fields.
#[macro_export]
macro_rules! cell_accessors(
    ($($field:ident: $ty:ty => $getter:ident, $setter:ident;)+) => {
        $(
            #[inline]
            pub fn $getter(&self) -> $ty {
                self.$field.get()
            }

            #[inline]
            pub fn $setter(
                &self,
                $field: $ty,
            ) {
                self.$field.set($field);
            }
        )+
    };
);

/// Logs and bails out of a handler when a client lookup fails.
#[macro_export]
macro_rules! client_or_return(
    ($model:expr, $window:expr) => {
        match $model.client($window) {
            Some(client) => client,
            None => {
                debug!("no managed client for window {:#0x}", $window);
                return;
            },
        }
    };
);
