use std::mem::size_of;

/// Element types storable in an [`Array`](crate::Array).
pub trait RuntimeValue: Clone + 'static {
    /// A present null counts as absent for `isset`.
    fn is_null(&self) -> bool {
        false
    }

    /// Heap bytes owned beyond `size_of::<Self>()`.
    fn estimate_memory_usage(&self) -> usize {
        0
    }
}

impl RuntimeValue for i64 {}
impl RuntimeValue for i32 {}
impl RuntimeValue for f64 {}
impl RuntimeValue for bool {}

impl RuntimeValue for String {
    fn estimate_memory_usage(&self) -> usize {
        self.capacity()
    }
}

impl<T: RuntimeValue> RuntimeValue for Option<T> {
    fn is_null(&self) -> bool {
        self.is_none()
    }

    fn estimate_memory_usage(&self) -> usize {
        self.as_ref().map_or(0, RuntimeValue::estimate_memory_usage)
    }
}

impl<T: RuntimeValue> RuntimeValue for Box<T> {
    fn is_null(&self) -> bool {
        (**self).is_null()
    }

    fn estimate_memory_usage(&self) -> usize {
        size_of::<T>() + (**self).estimate_memory_usage()
    }
}
