//! This should fail: a field is either an element value or a linked shape

use kontent_delivery_macros::ContentShape;

#[derive(ContentShape)]
struct Coffee {
    #[kontent(value, shape)]
    origin: String,
}

fn main() {}
