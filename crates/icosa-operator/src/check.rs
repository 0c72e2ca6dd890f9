//! Static checking of operator bodies against their signature.

use icosa_core::{classify, format_dims, Dimension, EvalError};
use icosa_mesh::Offset;

use crate::expr::Expr;
use crate::signature::Signature;

/// Where an expression node is evaluated.
#[derive(Clone, Copy)]
struct Site<'a> {
    horizontal: &'a Dimension,
    vertical: Option<&'a Dimension>,
    reduce: Option<&'a Offset>,
}

/// Check `body` against `sig`, returning the distinct offsets it uses.
pub(crate) fn check_body(body: &Expr, sig: &Signature) -> Result<Vec<Offset>, EvalError> {
    let site = Site {
        horizontal: sig.output_horizontal(),
        vertical: sig.output_vertical(),
        reduce: None,
    };
    check(body, sig, site)?;
    Ok(body.offsets().into_iter().cloned().collect())
}

fn mismatch(context: String, expected: impl Into<String>, found: impl Into<String>) -> EvalError {
    EvalError::DimensionMismatch {
        context,
        expected: expected.into(),
        found: found.into(),
    }
}

fn field_dims<'s>(sig: &'s Signature, name: &str) -> Result<&'s [Dimension], EvalError> {
    sig.params()
        .field(name)
        .ok_or_else(|| EvalError::UnboundArgument {
            param: name.to_string(),
        })
}

fn check_vertical(name: &str, dims: &[Dimension], site: Site<'_>) -> Result<(), EvalError> {
    let Some(v) = dims.iter().find(|d| d.is_vertical()) else {
        return Ok(());
    };
    match site.vertical {
        Some(out) if out == v => Ok(()),
        Some(out) => Err(mismatch(
            format!("vertical dimension of '{name}'"),
            out.name(),
            v.name(),
        )),
        None => Err(mismatch(
            format!("vertical dimension of '{name}'"),
            "no vertical dimension (output has none)",
            v.name(),
        )),
    }
}

fn check(expr: &Expr, sig: &Signature, site: Site<'_>) -> Result<(), EvalError> {
    match expr {
        Expr::Literal(_) => Ok(()),
        Expr::Scalar(name) => {
            if sig.params().has_scalar(name) {
                Ok(())
            } else {
                Err(EvalError::UnboundArgument {
                    param: name.clone(),
                })
            }
        }
        Expr::Field(name) => {
            let dims = field_dims(sig, name)?;
            let roles = classify(dims).map_err(|e| {
                mismatch(format!("field '{name}'"), "valid dimensions", e.to_string())
            })?;
            if let Some(h) = roles.horizontal.map(|a| &dims[a]) {
                if h != site.horizontal {
                    return Err(mismatch(
                        format!("field '{name}' read at a {} site", site.horizontal),
                        site.horizontal.name(),
                        format!("{} (read it through an offset)", h.name()),
                    ));
                }
            }
            if let Some(local) = roles.local.map(|a| &dims[a]) {
                match site.reduce {
                    Some(offset) if offset.local() == local => {}
                    Some(offset) => {
                        return Err(mismatch(
                            format!("sparse field '{name}'"),
                            offset.local().name(),
                            local.name(),
                        ))
                    }
                    None => {
                        return Err(mismatch(
                            format!("sparse field '{name}'"),
                            format!("a reduction over {}", local.name()),
                            "a read outside any reduction",
                        ))
                    }
                }
            }
            check_vertical(name, dims, site)
        }
        Expr::Shift { field, offset } => {
            match site.reduce {
                Some(r) if r == offset => {}
                Some(r) => {
                    return Err(mismatch(
                        format!("shift of '{field}'"),
                        format!("offset {}", r.name()),
                        format!("offset {}", offset.name()),
                    ))
                }
                None => {
                    return Err(mismatch(
                        format!("shift of '{field}' by {}", offset.name()),
                        "an enclosing reduction over the same offset",
                        "a shift outside any reduction",
                    ))
                }
            }
            let dims = field_dims(sig, field)?;
            let horizontal = dims.iter().find(|d| d.is_horizontal());
            if horizontal != Some(offset.source()) || dims.iter().any(Dimension::is_local) {
                return Err(mismatch(
                    format!("field '{field}' read through {}", offset.name()),
                    format!("a field on {}", offset.source()),
                    format_dims(dims),
                ));
            }
            check_vertical(field, dims, site)
        }
        Expr::Neg(inner) => check(inner, sig, site),
        Expr::Binary { lhs, rhs, .. } => {
            check(lhs, sig, site)?;
            check(rhs, sig, site)
        }
        Expr::Reduce {
            offset,
            body,
            weights,
        } => {
            if let Some(outer) = site.reduce {
                return Err(mismatch(
                    format!("reduction over {}", offset.name()),
                    "no enclosing reduction",
                    format!("nested inside a reduction over {}", outer.name()),
                ));
            }
            if offset.target() != site.horizontal {
                return Err(mismatch(
                    format!("reduction over {}", offset.name()),
                    format!("an offset targeting {}", site.horizontal),
                    offset.target().name(),
                ));
            }
            if let Some(w) = weights {
                if w.len() != offset.arity() {
                    return Err(EvalError::WeightCount {
                        offset: offset.name().to_string(),
                        expected: offset.arity(),
                        found: w.len(),
                    });
                }
            }
            check(
                body,
                sig,
                Site {
                    reduce: Some(offset),
                    ..site
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{field, lit, neighbor_sum, scalar, shift, sum_over};
    use icosa_core::HorizontalKind;

    fn cell() -> Dimension {
        Dimension::horizontal("Cell", HorizontalKind::Cell)
    }
    fn edge() -> Dimension {
        Dimension::horizontal("Edge", HorizontalKind::Edge)
    }
    fn k() -> Dimension {
        Dimension::vertical("K")
    }
    fn e2c() -> Offset {
        Offset::new("E2C", cell(), (edge(), Dimension::local("E2CDim", 2))).unwrap()
    }
    fn c2e() -> Offset {
        Offset::new("C2E", edge(), (cell(), Dimension::local("C2EDim", 3))).unwrap()
    }

    fn edge_sig() -> Signature {
        Signature::builder()
            .field("theta", [cell(), k()])
            .field("vn", [edge(), k()])
            .field("area", [edge()])
            .field("coeff", [k()])
            .scalar("fac")
            .output([edge(), k()])
            .build()
            .unwrap()
    }

    #[test]
    fn accepts_broadcast_reads() {
        let body = field("vn") + field("area") * field("coeff") * scalar("fac") - lit(1.0);
        assert!(check_body(&body, &edge_sig()).unwrap().is_empty());
    }

    #[test]
    fn accepts_weighted_shift() {
        let o = e2c();
        let body = field("vn") * sum_over(shift("theta", &o), &o, [-1.0, 1.0]);
        let offsets = check_body(&body, &edge_sig()).unwrap();
        assert_eq!(offsets, vec![o]);
    }

    #[test]
    fn rejects_unshifted_foreign_field() {
        let err = check_body(&field("theta"), &edge_sig()).unwrap_err();
        assert!(matches!(err, EvalError::DimensionMismatch { .. }));
    }

    #[test]
    fn rejects_shift_outside_reduction() {
        let err = check_body(&shift("theta", &e2c()), &edge_sig()).unwrap_err();
        assert!(matches!(err, EvalError::DimensionMismatch { ref found, .. } if found == "a shift outside any reduction"));
    }

    #[test]
    fn rejects_nested_reduction() {
        let o = e2c();
        let body = neighbor_sum(neighbor_sum(shift("theta", &o), &o), &o);
        let err = check_body(&body, &edge_sig()).unwrap_err();
        assert!(matches!(err, EvalError::DimensionMismatch { ref expected, .. } if expected == "no enclosing reduction"));
    }

    #[test]
    fn rejects_offset_targeting_other_site() {
        let o = c2e();
        let body = neighbor_sum(shift("vn", &o), &o);
        assert!(check_body(&body, &edge_sig()).is_err());
    }

    #[test]
    fn rejects_wrong_weight_count() {
        let o = e2c();
        let body = sum_over(shift("theta", &o), &o, [1.0, 1.0, 1.0]);
        assert_eq!(
            check_body(&body, &edge_sig()).unwrap_err(),
            EvalError::WeightCount {
                offset: "E2C".into(),
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn rejects_unknown_parameters() {
        assert_eq!(
            check_body(&field("nope"), &edge_sig()).unwrap_err(),
            EvalError::UnboundArgument {
                param: "nope".into()
            }
        );
        assert!(matches!(
            check_body(&scalar("nope"), &edge_sig()),
            Err(EvalError::UnboundArgument { .. })
        ));
    }

    #[test]
    fn rejects_vertical_read_into_level_less_output() {
        let sig = Signature::builder()
            .field("vn", [edge(), k()])
            .output([edge()])
            .build()
            .unwrap();
        assert!(check_body(&field("vn"), &sig).is_err());
    }

    #[test]
    fn sparse_field_requires_matching_reduction() {
        let o = c2e();
        let sig = Signature::builder()
            .field("vn", [edge(), k()])
            .field("geofac_div", [cell(), Dimension::local("C2EDim", 3)])
            .output([cell(), k()])
            .build()
            .unwrap();
        let ok = neighbor_sum(shift("vn", &o) * field("geofac_div"), &o);
        assert!(check_body(&ok, &sig).is_ok());
        let err = check_body(&field("geofac_div"), &sig).unwrap_err();
        assert!(matches!(err, EvalError::DimensionMismatch { ref context, .. } if context.starts_with("sparse field")));
    }
}
