//! Call expressions produced by resolution.
//!
//! A [`CallExpression`] is the resolver's answer for one or more attributes:
//! which method to call, with which wrapper around each value. Rendering is a
//! pure function of the target and value expressions handed in by the code
//! generator.
//!
//! | Kind           | Rendered as                                    |
//! |----------------|------------------------------------------------|
//! | `Direct`       | `target.method(value)`                         |
//! | `Adapter`      | `Type.adapter(target, value)`                  |
//! | `MultiAdapter` | `Type.adapter(target, value1, value2, ...)`    |
//! | `Fallback`     | `target.setAttribute(value)`                   |

use std::fmt::Write;

use attrbind_core::{AttributeName, MethodDescriptor, RenderError, TypeRef};

/// What happens to a value before it is passed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValueWrapper {
    #[default]
    None,
    /// Pass `Type.method(value)`.
    Convert(MethodDescriptor),
    /// Pass `(Type) value`.
    Cast(TypeRef),
}

impl ValueWrapper {
    fn write(&self, out: &mut String, value: &str) {
        // Writing to a String cannot fail.
        let _ = match self {
            ValueWrapper::None => write!(out, "{value}"),
            ValueWrapper::Convert(method) => {
                write!(out, "{}({value})", method.qualified_call_name())
            }
            ValueWrapper::Cast(ty) => write!(out, "({ty}) {value}"),
        };
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ValueWrapper::None)
    }
}

/// A resolved setter call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallExpression {
    /// An instance method on the target.
    Direct {
        attribute: AttributeName,
        method_name: String,
        wrapper: ValueWrapper,
        /// Inherited from the resolved method.
        min_api: u32,
    },

    /// A static adapter taking the target and one value.
    Adapter {
        attribute: AttributeName,
        adapter: MethodDescriptor,
        wrapper: ValueWrapper,
        min_api: u32,
    },

    /// A static adapter taking the target and one value per attribute.
    MultiAdapter {
        /// Consumed attributes, in the adapter's parameter order.
        attributes: Vec<AttributeName>,
        adapter: MethodDescriptor,
        /// One wrapper per attribute.
        wrappers: Vec<ValueWrapper>,
        min_api: u32,
    },

    /// Best guess when nothing matched: the conventional setter name.
    Fallback {
        attribute: AttributeName,
        method_name: String,
        min_api: u32,
    },
}

impl CallExpression {
    /// Attributes this call binds, in the order values must be passed.
    pub fn attributes(&self) -> &[AttributeName] {
        match self {
            CallExpression::Direct { attribute, .. }
            | CallExpression::Adapter { attribute, .. }
            | CallExpression::Fallback { attribute, .. } => std::slice::from_ref(attribute),
            CallExpression::MultiAdapter { attributes, .. } => attributes,
        }
    }

    /// Number of value expressions [`render`](Self::render) expects.
    pub fn arity(&self) -> usize {
        self.attributes().len()
    }

    /// Lowest platform version on which the call is available.
    pub fn min_api(&self) -> u32 {
        match self {
            CallExpression::Direct { min_api, .. }
            | CallExpression::Adapter { min_api, .. }
            | CallExpression::MultiAdapter { min_api, .. }
            | CallExpression::Fallback { min_api, .. } => *min_api,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CallExpression::Fallback { .. })
    }

    /// Name of the method the call invokes, without the declaring type.
    pub fn method_name(&self) -> &str {
        match self {
            CallExpression::Direct { method_name, .. }
            | CallExpression::Fallback { method_name, .. } => method_name,
            CallExpression::Adapter { adapter, .. }
            | CallExpression::MultiAdapter { adapter, .. } => &adapter.method_name,
        }
    }

    /// Render the call against `target` with one value expression per attribute.
    ///
    /// # Errors
    ///
    /// [`RenderError::ArityMismatch`] if `values.len()` differs from [`arity`](Self::arity).
    pub fn render(&self, target: &str, values: &[&str]) -> Result<String, RenderError> {
        if values.len() != self.arity() {
            return Err(RenderError::ArityMismatch {
                call: self.method_name().to_string(),
                expected: self.arity(),
                found: values.len(),
            });
        }

        let mut out = String::new();
        match self {
            CallExpression::Direct {
                method_name,
                wrapper,
                ..
            } => {
                out.push_str(target);
                out.push('.');
                out.push_str(method_name);
                out.push('(');
                wrapper.write(&mut out, values[0]);
            }
            CallExpression::Adapter {
                adapter, wrapper, ..
            } => {
                out.push_str(&adapter.qualified_call_name());
                out.push('(');
                out.push_str(target);
                out.push_str(", ");
                wrapper.write(&mut out, values[0]);
            }
            CallExpression::MultiAdapter {
                adapter, wrappers, ..
            } => {
                out.push_str(&adapter.qualified_call_name());
                out.push('(');
                out.push_str(target);
                for (wrapper, value) in wrappers.iter().zip(values) {
                    out.push_str(", ");
                    wrapper.write(&mut out, value);
                }
            }
            CallExpression::Fallback { method_name, .. } => {
                out.push_str(target);
                out.push('.');
                out.push_str(method_name);
                out.push('(');
                out.push_str(values[0]);
            }
        }
        out.push(')');
        Ok(out)
    }
}
