pub(crate) mod hashing;
