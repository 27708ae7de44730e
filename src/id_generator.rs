use std::sync::atomic::{AtomicUsize, Ordering};

// Shared by every scene object so ids stay unique across layers and surfaces.
// Zero is reserved for previews that are never committed.
static NEXT_OBJECT_ID: AtomicUsize = AtomicUsize::new(1);

pub fn generate_id() -> usize {
    NEXT_OBJECT_ID.fetch_add(1, Ordering::SeqCst)
}
