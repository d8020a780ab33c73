//! This should fail: a generic struct has no single binding table

use kontent_delivery_macros::ContentShape;

#[derive(ContentShape)]
struct Wrapper<T> {
    inner: T,
}

fn main() {}
