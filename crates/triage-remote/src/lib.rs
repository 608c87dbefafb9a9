pub mod api;
pub mod error;
pub mod memory;

pub use api::*;
pub use error::*;
pub use memory::*;

#[cfg(test)]
mod tests {
    use super::{InMemoryApi, IncidentApi, ListQuery, RemoteError};
    use std::any::TypeId;

    #[test]
    fn crate_root_reexports_types() {
        let _ = TypeId::of::<RemoteError>();
        let _ = TypeId::of::<ListQuery>();
        let _ = TypeId::of::<InMemoryApi>();
    }

    #[test]
    fn in_memory_api_satisfies_the_seam() {
        fn assert_api<T: IncidentApi>(_: &T) {}
        assert_api(&InMemoryApi::default());
    }
}
