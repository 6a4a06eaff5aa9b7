//! Typed read/write access to a single host slot

use crate::allocator::Allocator;
use crate::convert::{FromTagged, IntoTagged};
use crate::error::CallResult;
use crate::value::{TaggedValue, VarType};

/// Conversion wrapper around one host-owned [`TaggedValue`].
///
/// Reads check the tag and never mutate the slot. Writes build the new
/// contents off to the side and assign tag and payload together, so the
/// slot is never observed with a stale tag next to a new payload.
pub struct Accessor<'a> {
    slot: &'a mut TaggedValue,
    allocator: Option<&'a dyn Allocator>,
}

impl<'a> Accessor<'a> {
    /// Wrap a slot. `allocator` is only needed for string and blob writes.
    pub fn new(slot: &'a mut TaggedValue, allocator: Option<&'a dyn Allocator>) -> Self {
        Accessor { slot, allocator }
    }

    /// Wrap every slot of a host parameter array
    pub fn wrap_all(slots: &'a mut [TaggedValue], allocator: Option<&'a dyn Allocator>) -> Vec<Self> {
        slots
            .iter_mut()
            .map(|slot| Accessor::new(slot, allocator))
            .collect()
    }

    /// Current tag, `None` if the host stored an unknown value
    pub fn var_type(&self) -> Option<VarType> {
        self.slot.var_type()
    }

    /// The wrapped slot
    pub fn slot(&self) -> &TaggedValue {
        &*self.slot
    }

    /// Host allocator, if one was supplied
    pub fn allocator(&self) -> Option<&'a dyn Allocator> {
        self.allocator
    }

    /// Read the slot as `T`.
    ///
    /// Borrowed results (`&str`, `&[u16]`, `&[u8]`) live as long as the
    /// borrow of this accessor.
    pub fn read<'s, T: FromTagged<'s>>(&'s self) -> CallResult<T> {
        T::from_tagged(&*self.slot)
    }

    /// Write `value`, replacing the slot's contents.
    ///
    /// The slot is reset to empty first and stays empty if the conversion
    /// fails.
    pub fn write<T: IntoTagged + ?Sized>(&mut self, value: &T) -> CallResult<()> {
        self.slot.reset();
        let staged = self.stage(value)?;
        self.commit(staged);
        Ok(())
    }

    /// Convert `value` into detached slot contents using this slot's allocator
    pub fn stage<T: IntoTagged + ?Sized>(&self, value: &T) -> CallResult<TaggedValue> {
        value.into_tagged(self.allocator)
    }

    /// Assign previously staged contents
    pub fn commit(&mut self, staged: TaggedValue) {
        *self.slot = staged;
    }
}

impl std::fmt::Debug for Accessor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor")
            .field("slot", &self.slot)
            .field("has_allocator", &self.allocator.is_some())
            .finish()
    }
}
