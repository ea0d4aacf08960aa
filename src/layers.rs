pub(crate) mod image;
pub(crate) mod pcm;
pub(crate) mod solid;
