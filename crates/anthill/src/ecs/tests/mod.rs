//! Engine-level tests spanning scenarios, families and entities
