use std::ops::{Deref, DerefMut};

/// A type thats assumed to exist when accessed
pub enum Exists<T> {
    Some(T),
    None,
}

impl<T> Exists<T> {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl<T> Deref for Exists<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        match self {
            Exists::Some(v) => v,
            Exists::None => panic!("Type expected to exist by now but didn't"),
        }
    }
}

impl<T> DerefMut for Exists<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Exists::Some(v) => v,
            Exists::None => panic!("Type expected to exist by now but didn't"),
        }
    }
}
