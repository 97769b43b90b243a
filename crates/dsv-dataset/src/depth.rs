use serde_json::Value;

/// Structural nesting depth of a value.
///
/// Scalars have depth 0. Arrays and objects have depth one greater than
/// their deepest child; an empty container has depth 1. Walks with an
/// explicit stack, so arbitrarily deep input cannot overflow the call stack.
pub fn depth(value: &Value) -> usize {
    let mut max = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((node, level)) = stack.pop() {
        match node {
            Value::Array(items) => {
                max = max.max(level + 1);
                stack.extend(items.iter().map(|child| (child, level + 1)));
            }
            Value::Object(map) => {
                max = max.max(level + 1);
                stack.extend(map.values().map(|child| (child, level + 1)));
            }
            _ => max = max.max(level),
        }
    }
    max
}
