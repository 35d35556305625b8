/// Declares `$name`, a typed position into a `Vec<$t>`.
///
/// The id only indexes the collection it was handed out by; `ids(len)`
/// enumerates every position of a collection of `len` items.
#[macro_export]
macro_rules! define_index_newtype {
    ($name:ident, $t:ident) => {
        #[derive(
            serde::Serialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
        )]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            pub const fn get(&self) -> usize {
                self.0
            }

            pub fn ids(len: usize) -> impl Iterator<Item = $name> {
                (0..len).map($name)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::ops::Index<$name> for Vec<$t> {
            type Output = $t;

            fn index(&self, id: $name) -> &$t {
                &self[id.0]
            }
        }
    };
}
