//! Type-erased container for pre-initialized feature slices.

use fxhash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt::Debug;

/// State owned by a vertical slice, shared across request handlers.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Short, stable name used in diagnostics.
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }
}

/// Slices keyed by their concrete type. Registering a type twice replaces it.
#[derive(Debug, Default)]
pub struct SliceRegistry {
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl SliceRegistry {
    pub fn insert(&mut self, slice: InitializedSlice) {
        if let Some(previous) = self.slices.insert(slice.id, slice) {
            tracing::warn!(slice = previous.state.name(), "Feature slice registered twice");
        }
    }

    #[must_use]
    pub fn get<T: FeatureSlice>(&self) -> Option<&T> {
        self.slices.get(&TypeId::of::<T>()).and_then(|slice| slice.state.as_any().downcast_ref::<T>())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slices.values().map(|slice| slice.state.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slices.len()
    }
}

impl Extend<InitializedSlice> for SliceRegistry {
    fn extend<I: IntoIterator<Item = InitializedSlice>>(&mut self, iter: I) {
        for slice in iter {
            self.insert(slice);
        }
    }
}
