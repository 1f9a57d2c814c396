//! `mockall` gateway shared by the crate's unit tests.

use mockall::mock;

use super::{
    CreateImageRequest, CreateStackRequest, ImageRef, ImageState, InstanceRef, KeyValues,
    ProviderFuture, ProviderGateway, StackState, StackSummary, TaggedResource,
};

mock! {
    #[derive(Debug)]
    pub Gateway {}

    impl ProviderGateway for Gateway {
        fn create_stack(&self, request: CreateStackRequest) -> ProviderFuture<'_, String>;
        fn delete_stack(&self, stack_name: String) -> ProviderFuture<'_, ()>;
        fn list_stacks(&self) -> ProviderFuture<'_, Vec<StackSummary>>;
        fn stack_state(&self, stack_name: String) -> ProviderFuture<'_, Option<StackState>>;
        fn describe_instances(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<InstanceRef>>;
        fn describe_images(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<ImageRef>>;
        fn describe_volumes(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>>;
        fn describe_snapshots(&self, filters: KeyValues) -> ProviderFuture<'_, Vec<TaggedResource>>;
        fn describe_addresses(&self) -> ProviderFuture<'_, Vec<String>>;
        fn create_image(&self, request: CreateImageRequest) -> ProviderFuture<'_, String>;
        fn deregister_image(&self, image_id: String) -> ProviderFuture<'_, ()>;
        fn image_state(&self, image_id: String) -> ProviderFuture<'_, Option<ImageState>>;
    }
}
