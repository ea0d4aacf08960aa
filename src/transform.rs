pub(crate) mod affine;
pub(crate) mod direction;
pub(crate) mod value;
