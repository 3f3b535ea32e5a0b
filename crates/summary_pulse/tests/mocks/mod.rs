pub mod archive;
pub mod completion;
pub mod datastore;
