use serde_json::{Value, json};

/// A node with the given style and no children.
pub fn node(style: Value) -> Value {
    json!({ "style": style })
}

/// A node with the given style and children.
pub fn container(style: Value, children: Vec<Value>) -> Value {
    json!({ "style": style, "children": children })
}

/// A fixed-size box.
pub fn sized(width: f32, height: f32) -> Value {
    node(json!({ "width": width, "height": height }))
}

/// A measured leaf whose natural content size is `width` x `height`.
pub fn text(width: f32, height: f32) -> Value {
    json!({ "measure": { "width": width, "height": height } })
}

/// A 100x100 root with `style` merged in.
pub fn square_root(style: Value, children: Vec<Value>) -> Value {
    let mut merged = json!({ "width": 100, "height": 100 });
    if let (Some(base), Some(extra)) = (merged.as_object_mut(), style.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }
    container(merged, children)
}
