//! Function resolution and overload disambiguation

use tracing::debug;

use crate::function::{Function, MutabilityClass};
use crate::interface::Abi;
use crate::value::{describe_shapes, Value};
use crate::AbiError;

/// Select the single function `name` on the `class` path that accepts `args`
///
/// A name with one candidate resolves without looking at the arguments, so
/// arity problems surface later as [`AbiError::ArgumentCount`]. Overloaded
/// names are matched by widened argument shape; omitted arguments count as
/// an empty list. Ties are never broken.
pub fn resolve<'a>(
    abi: &'a Abi,
    name: &str,
    args: Option<&[Value]>,
    class: MutabilityClass,
) -> Result<&'a Function, AbiError> {
    let candidates: Vec<&Function> = abi
        .functions()
        .filter(|f| f.name == name && class.admits(f.state_mutability))
        .collect();

    match candidates.as_slice() {
        [] => Err(AbiError::FunctionNotFound {
            name: name.to_string(),
            class,
        }),
        [only] => {
            debug!(function = %only.signature(), "resolved without overloads");
            Ok(*only)
        }
        _ => {
            let args = args.unwrap_or(&[]);
            let matching: Vec<&Function> = candidates
                .iter()
                .copied()
                .filter(|f| accepts(f, args))
                .collect();

            match matching.as_slice() {
                [chosen] => {
                    debug!(
                        function = %chosen.signature(),
                        overloads = candidates.len(),
                        "resolved overload"
                    );
                    Ok(*chosen)
                }
                [] => Err(AbiError::NoMatchingOverload {
                    name: name.to_string(),
                    supplied: describe_shapes(args),
                    candidates: candidates.iter().map(|f| f.signature()).collect(),
                }),
                tied => Err(AbiError::AmbiguousOverload {
                    name: name.to_string(),
                    candidates: tied.iter().map(|f| f.signature()).collect(),
                }),
            }
        }
    }
}

/// Positional inputs pairwise compatible with the widened arguments
fn accepts(function: &Function, args: &[Value]) -> bool {
    function.inputs.len() == args.len()
        && function
            .inputs
            .iter()
            .zip(args)
            .all(|(param, arg)| arg.shape().fits(&param.kind))
}
