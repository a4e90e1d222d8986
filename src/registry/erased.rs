// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Owned, type-erased storage for a single value.
//!
//! The registry moves arguments into an invoker and results out of it through
//! slots, without knowing their types at the point the registry is declared.
//! A slot owns what it holds: whatever is still inside when the slot is
//! dropped is dropped with it, so a value is torn down exactly once whether it
//! was taken, left behind after a panic, or never read.

use std::any::{type_name, Any};
use std::fmt;

use super::errors::CacheError;

/// A put-once, take-once container for a value of any `'static` type.
#[derive(Default)]
pub struct ErasedSlot {
    value: Option<Box<dyn Any>>,

    /// Name of the stored type, for error messages.
    held: Option<&'static str>,
}

impl ErasedSlot {
    /// Create an empty slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a slot already holding `value`.
    pub fn holding<T: 'static>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
            held: Some(type_name::<T>()),
        }
    }

    /// Move `value` into the slot.
    ///
    /// Fails if the slot is already occupied; `value` is dropped in that case
    /// and the stored value is left untouched.
    pub fn put<T: 'static>(&mut self, value: T) -> Result<(), CacheError> {
        if let Some(held) = self.held {
            return Err(CacheError::SlotOccupied { held });
        }
        self.value = Some(Box::new(value));
        self.held = Some(type_name::<T>());
        Ok(())
    }

    /// Move the stored value out of the slot.
    ///
    /// On a type mismatch the value stays in the slot (and is dropped with it).
    pub fn take<T: 'static>(&mut self) -> Result<T, CacheError> {
        let expected = type_name::<T>();
        let boxed = self.value.take().ok_or(CacheError::SlotEmpty { expected })?;
        match boxed.downcast::<T>() {
            Ok(value) => {
                self.held = None;
                Ok(*value)
            }
            Err(boxed) => {
                self.value = Some(boxed);
                Err(CacheError::TypeMismatch {
                    expected,
                    found: self.held.unwrap_or("<unknown>"),
                })
            }
        }
    }

    /// True if the slot holds a value.
    pub fn is_occupied(&self) -> bool {
        self.value.is_some()
    }

    /// Name of the stored type, if any.
    pub fn type_name(&self) -> Option<&'static str> {
        self.held
    }
}

impl fmt::Debug for ErasedSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedSlot").field("held", &self.held).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_put_then_take() {
        let mut slot = ErasedSlot::empty();
        assert!(!slot.is_occupied());

        slot.put(String::from("value")).unwrap();
        assert!(slot.is_occupied());
        assert_eq!(slot.type_name(), Some("alloc::string::String"));

        assert_eq!(slot.take::<String>().unwrap(), "value");
        assert!(!slot.is_occupied());
        assert_eq!(slot.type_name(), None);
    }

    #[test]
    fn test_put_into_occupied_slot_fails() {
        let mut slot = ErasedSlot::holding(1u8);
        assert_eq!(slot.put(2u8), Err(CacheError::SlotOccupied { held: "u8" }));
        assert_eq!(slot.take::<u8>(), Ok(1));
    }

    #[test]
    fn test_take_from_empty_slot_fails() {
        let mut slot = ErasedSlot::empty();
        assert_eq!(slot.take::<u32>(), Err(CacheError::SlotEmpty { expected: "u32" }));
    }

    #[test]
    fn test_type_mismatch_keeps_value() {
        let mut slot = ErasedSlot::holding(7i64);
        assert_eq!(
            slot.take::<u64>(),
            Err(CacheError::TypeMismatch {
                expected: "u64",
                found: "i64"
            })
        );
        assert_eq!(slot.take::<i64>(), Ok(7));
    }

    #[test]
    fn test_slot_can_be_refilled_after_take() {
        let mut slot = ErasedSlot::holding(1u8);
        slot.take::<u8>().unwrap();
        slot.put("again").unwrap();
        assert_eq!(slot.take::<&str>(), Ok("again"));
    }

    #[test]
    fn test_unread_value_is_dropped_with_slot() {
        let resource = Rc::new(());
        let slot = ErasedSlot::holding(Rc::clone(&resource));
        assert_eq!(Rc::strong_count(&resource), 2);
        drop(slot);
        assert_eq!(Rc::strong_count(&resource), 1);
    }

    #[test]
    fn test_taken_value_is_not_dropped_twice() {
        let resource = Rc::new(());
        let mut slot = ErasedSlot::holding(Rc::clone(&resource));
        let taken = slot.take::<Rc<()>>().unwrap();
        drop(slot);
        assert_eq!(Rc::strong_count(&resource), 2);
        drop(taken);
        assert_eq!(Rc::strong_count(&resource), 1);
    }
}
