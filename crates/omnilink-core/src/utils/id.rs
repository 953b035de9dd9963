// ID generation — nanoid-based unique identifiers.

/// Generate a unique ID (21 characters).
pub fn generate_id() -> String {
    nanoid::nanoid!()
}

/// Generate an ID with a custom length.
pub fn generate_id_with_length(len: usize) -> String {
    nanoid::nanoid!(len)
}
