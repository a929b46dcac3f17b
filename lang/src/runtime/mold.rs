use im_rc::Vector;

use super::context::Context;
use super::error::RuntimeError;
use super::value::Value;

/// Reshape `content` into the structure of `shape`.
///
/// Leaves are filled depth-first, left to right, each taking the front of
/// `content` and cycling it to the back. Scalar content is treated as a
/// one-element list; the caller's value is left untouched.
pub fn mold(content: &Value, shape: &Value, ctx: &mut Context) -> Result<Value, RuntimeError> {
    let Value::List(shape) = shape else {
        return Err(RuntimeError::type_mismatch(format!(
            "mold expects a List shape, got {}",
            shape.type_name()
        )));
    };

    let mut pool = match content {
        Value::List(sequence) => sequence.force(ctx)?,
        scalar => Vector::unit(scalar.clone()),
    };

    let shape = shape.force(ctx)?;
    fill(&shape, &mut pool, ctx).map(Value::from)
}

fn fill(
    shape: &Vector<Value>,
    pool: &mut Vector<Value>,
    ctx: &mut Context,
) -> Result<Vector<Value>, RuntimeError> {
    let mut molded = Vector::new();
    for slot in shape {
        match slot {
            Value::List(nested) => {
                let nested = nested.force(ctx)?;
                molded.push_back(Value::from(fill(&nested, pool, ctx)?));
            }
            _ => {
                let Some(item) = pool.pop_front() else {
                    return Err(RuntimeError::malformed_shape(
                        "cannot fill a shape from empty content",
                    ));
                };
                pool.push_back(item.clone());
                molded.push_back(item);
            }
        }
    }
    Ok(molded)
}
