//! Settable targets
//!
//! A tween never knows what it animates. It writes through a [`Settable`],
//! which the caller builds at the call site: a field on a shared object, a
//! shared uniform cell, or an arbitrary setter closure.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::TargetError;

/// A mutable location a tween writes its current value into
pub trait Settable {
    /// Write a new value
    fn set(&mut self, value: f32) -> Result<(), TargetError>;

    /// Read the current value, if the target exposes one
    fn get(&self) -> Option<f32>;
}

/// A shared scalar cell, the usual home of a shader uniform value
#[derive(Clone, Debug, Default)]
pub struct SharedValue(Rc<Cell<f32>>);

impl SharedValue {
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value);
    }

    /// A handle that writes into this cell without keeping it alive
    pub fn downgrade(&self) -> WeakValue {
        WeakValue(Rc::downgrade(&self.0))
    }
}

impl Settable for SharedValue {
    fn set(&mut self, value: f32) -> Result<(), TargetError> {
        self.0.set(value);
        Ok(())
    }

    fn get(&self) -> Option<f32> {
        Some(self.0.get())
    }
}

/// Weak counterpart of [`SharedValue`]
#[derive(Clone, Debug)]
pub struct WeakValue(Weak<Cell<f32>>);

impl Settable for WeakValue {
    fn set(&mut self, value: f32) -> Result<(), TargetError> {
        let cell = self.0.upgrade().ok_or(TargetError::Dropped)?;
        cell.set(value);
        Ok(())
    }

    fn get(&self) -> Option<f32> {
        self.0.upgrade().map(|cell| cell.get())
    }
}

/// A named field on a shared object.
///
/// Holds only a weak reference, so the owner stays free to drop the object
/// while a tween still points at it.
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use halo_animation::{Property, Settable};
///
/// struct Uniforms { radius: f32 }
///
/// let uniforms = Rc::new(RefCell::new(Uniforms { radius: 0.5 }));
/// let mut radius = Property::new(&uniforms, |u| &mut u.radius);
/// radius.set(0.9).unwrap();
/// assert_eq!(uniforms.borrow().radius, 0.9);
/// ```
pub struct Property<T> {
    object: Weak<RefCell<T>>,
    field: fn(&mut T) -> &mut f32,
}

impl<T> Property<T> {
    pub fn new(object: &Rc<RefCell<T>>, field: fn(&mut T) -> &mut f32) -> Self {
        Self {
            object: Rc::downgrade(object),
            field,
        }
    }
}

impl<T> Settable for Property<T> {
    fn set(&mut self, value: f32) -> Result<(), TargetError> {
        let object = self.object.upgrade().ok_or(TargetError::Dropped)?;
        let mut object = object.try_borrow_mut().map_err(|_| TargetError::Busy)?;
        *(self.field)(&mut object) = value;
        Ok(())
    }

    fn get(&self) -> Option<f32> {
        let object = self.object.upgrade()?;
        let mut object = object.try_borrow_mut().ok()?;
        Some(*(self.field)(&mut object))
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("alive", &(self.object.strong_count() > 0))
            .finish()
    }
}

/// A setter closure, optionally paired with a getter
pub struct Setter {
    set: Box<dyn FnMut(f32)>,
    get: Option<Box<dyn Fn() -> f32>>,
}

impl Setter {
    pub fn new(set: impl FnMut(f32) + 'static) -> Self {
        Self {
            set: Box::new(set),
            get: None,
        }
    }

    /// Attach a getter so the setter can seed `from` values
    pub fn with_getter(mut self, get: impl Fn() -> f32 + 'static) -> Self {
        self.get = Some(Box::new(get));
        self
    }
}

impl Settable for Setter {
    fn set(&mut self, value: f32) -> Result<(), TargetError> {
        (self.set)(value);
        Ok(())
    }

    fn get(&self) -> Option<f32> {
        self.get.as_ref().map(|get| get())
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("readable", &self.get.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ring {
        radius: f32,
        glow: f32,
    }

    #[test]
    fn test_property_writes_field() {
        let ring = Rc::new(RefCell::new(Ring {
            radius: 0.5,
            glow: 1.0,
        }));
        let mut glow = Property::new(&ring, |r| &mut r.glow);

        assert_eq!(glow.get(), Some(1.0));
        glow.set(20.0).unwrap();
        assert_eq!(ring.borrow().glow, 20.0);
        assert_eq!(ring.borrow().radius, 0.5);
    }

    #[test]
    fn test_property_tolerates_dropped_object() {
        let ring = Rc::new(RefCell::new(Ring {
            radius: 0.5,
            glow: 1.0,
        }));
        let mut radius = Property::new(&ring, |r| &mut r.radius);
        drop(ring);

        assert_eq!(radius.set(1.0), Err(TargetError::Dropped));
        assert_eq!(radius.get(), None);
    }

    #[test]
    fn test_property_reports_busy() {
        let ring = Rc::new(RefCell::new(Ring {
            radius: 0.5,
            glow: 1.0,
        }));
        let mut radius = Property::new(&ring, |r| &mut r.radius);

        let _guard = ring.borrow();
        assert_eq!(radius.set(1.0), Err(TargetError::Busy));
    }

    #[test]
    fn test_shared_values_and_setters() {
        let cell = SharedValue::new(0.0);
        let mut weak = cell.downgrade();
        Settable::set(&mut weak, 3.0).unwrap();
        assert_eq!(cell.get(), 3.0);
        assert_eq!(Settable::get(&weak), Some(3.0));

        let seen = SharedValue::new(0.0);
        let sink = seen.clone();
        let mut setter = Setter::new(move |v| sink.set(v));
        assert_eq!(setter.get(), None);
        setter.set(7.5).unwrap();
        assert_eq!(seen.get(), 7.5);

        drop(cell);
        assert_eq!(Settable::set(&mut weak, 1.0), Err(TargetError::Dropped));
    }
}
