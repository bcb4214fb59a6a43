/// A record the data provider hands out by id.
///
/// Two snapshots with equal ids describe the same inventory item, product,
/// customer or order at different times; views use the id to find a record
/// again after a refresh.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}
