//! Stencils of the ICON nonhydrostatic diffusion scheme.
//!
//! Each [`DiffusionStencil`] is a [`Program`] over the ICON dimensions with
//! its own default horizontal band:
//!
//! | stencil | writes            | default band              |
//! |---------|-------------------|---------------------------|
//! | 02      | `kh_c`, `div`     | `[nudging, halo)`         |
//! | 06      | `vn`              | `[lb + 4, nudging + 1)`   |
//! | 13      | `z_nabla2_e`      | `[nudging, halo + 1)`     |
//!
//! All three sweep the levels upward.

use std::sync::Arc;

use icosa_core::Element;
use icosa_engine::Program;
use icosa_mesh::Domain;
use icosa_operator::expr::{field, neighbor_sum, scalar, shift, sum_over};
use icosa_operator::{ExprOperator, Invocation};

use crate::error::StencilError;
use crate::icon::{self, c2e_dim, cell, edge, k};

/// The diffusion stencils.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiffusionStencil {
    /// Stencil 02: Smagorinsky coefficient and divergence at cell centres.
    ///
    /// ```text
    /// kh_c = Σ_C2E(kh_smag_ec · e_bln_c_s) / diff_multfac_smag
    /// div  = Σ_C2E(vn · geofac_div)
    /// ```
    CellDivergence,
    /// Stencil 06: boundary update of the normal velocity.
    ///
    /// ```text
    /// vn = vn + z_nabla2_e · area_edge · fac_bdydiff_v
    /// ```
    BoundaryVelocity,
    /// Stencil 13: scaled gradient of `theta_v` across each edge.
    ///
    /// ```text
    /// z_nabla2_e = kh_smag_e · inv_dual_edge_length · (theta_v[E2C₁] − theta_v[E2C₀])
    /// ```
    ThetaGradient,
}

impl DiffusionStencil {
    /// All stencils in numbering order.
    pub const ALL: [Self; 3] = [
        Self::CellDivergence,
        Self::BoundaryVelocity,
        Self::ThetaGradient,
    ];

    /// The ICON routine name.
    pub fn name(self) -> &'static str {
        match self {
            Self::CellDivergence => "mo_nh_diffusion_stencil_02",
            Self::BoundaryVelocity => "mo_nh_diffusion_stencil_06",
            Self::ThetaGradient => "mo_nh_diffusion_stencil_13",
        }
    }

    /// The band the stencil runs over on a full ICON grid.
    pub fn default_domain(self) -> Domain {
        let band = match self {
            Self::CellDivergence => icon::NUDGING..icon::HALO,
            Self::BoundaryVelocity => icon::LB + 4..icon::NUDGING + 1,
            Self::ThetaGradient => icon::NUDGING..icon::HALO + 1,
        };
        Domain::upward().across(band)
    }

    /// The program over [`default_domain`](Self::default_domain).
    pub fn program<T: Element>(self) -> Result<Program<T>, StencilError> {
        self.program_over(self.default_domain())
    }

    /// The program over an explicit domain.
    pub fn program_over<T: Element>(self, domain: Domain) -> Result<Program<T>, StencilError> {
        let builder = Program::<T>::builder(self.name());
        let builder = match self {
            Self::CellDivergence => builder
                .field("kh_smag_ec", [edge(), k()])
                .field("vn", [edge(), k()])
                .field("e_bln_c_s", [cell(), c2e_dim()])
                .field("geofac_div", [cell(), c2e_dim()])
                .field("diff_multfac_smag", [k()])
                .field("kh_c", [cell(), k()])
                .field("div", [cell(), k()])
                .with_domain(
                    domain,
                    [
                        Invocation::<T>::new(Arc::new(kh_c()?)).out("kh_c"),
                        Invocation::<T>::new(Arc::new(div()?)).out("div"),
                    ],
                ),
            Self::BoundaryVelocity => builder
                .field("z_nabla2_e", [edge(), k()])
                .field("area_edge", [edge()])
                .field("vn", [edge(), k()])
                .scalar("fac_bdydiff_v")
                .statement(
                    Invocation::<T>::new(Arc::new(vn_boundary_update()?))
                        .out("vn")
                        .domain(domain),
                ),
            Self::ThetaGradient => builder
                .field("kh_smag_e", [edge(), k()])
                .field("inv_dual_edge_length", [edge()])
                .field("theta_v", [cell(), k()])
                .field("z_nabla2_e", [edge(), k()])
                .statement(
                    Invocation::<T>::new(Arc::new(theta_gradient()?))
                        .out("z_nabla2_e")
                        .domain(domain),
                ),
        };
        Ok(builder.build()?)
    }
}

// ── Operators ──────────────────────────────────────────────────────

/// `Σ_C2E(kh_smag_ec · e_bln_c_s) / diff_multfac_smag` on `[Cell, K]`.
pub fn kh_c() -> Result<ExprOperator, StencilError> {
    let c2e = icon::c2e()?;
    Ok(ExprOperator::builder("kh_c")
        .field("kh_smag_ec", [edge(), k()])
        .field("e_bln_c_s", [cell(), c2e_dim()])
        .field("diff_multfac_smag", [k()])
        .output([cell(), k()])
        .body(
            neighbor_sum(shift("kh_smag_ec", &c2e) * field("e_bln_c_s"), &c2e)
                / field("diff_multfac_smag"),
        )
        .build()?)
}

/// `Σ_C2E(vn · geofac_div)` on `[Cell, K]`.
pub fn div() -> Result<ExprOperator, StencilError> {
    let c2e = icon::c2e()?;
    Ok(ExprOperator::builder("div")
        .field("vn", [edge(), k()])
        .field("geofac_div", [cell(), c2e_dim()])
        .output([cell(), k()])
        .body(neighbor_sum(shift("vn", &c2e) * field("geofac_div"), &c2e))
        .build()?)
}

/// `vn + z_nabla2_e · area_edge · fac_bdydiff_v` on `[Edge, K]`.
pub fn vn_boundary_update() -> Result<ExprOperator, StencilError> {
    Ok(ExprOperator::builder("vn_boundary_update")
        .field("vn", [edge(), k()])
        .field("z_nabla2_e", [edge(), k()])
        .field("area_edge", [edge()])
        .scalar("fac_bdydiff_v")
        .output([edge(), k()])
        .body(field("vn") + field("z_nabla2_e") * field("area_edge") * scalar("fac_bdydiff_v"))
        .build()?)
}

/// `kh_smag_e · inv_dual_edge_length · Σ_E2C([-1, 1] · theta_v)` on
/// `[Edge, K]`.
pub fn theta_gradient() -> Result<ExprOperator, StencilError> {
    let e2c = icon::e2c()?;
    Ok(ExprOperator::builder("theta_gradient")
        .field("kh_smag_e", [edge(), k()])
        .field("inv_dual_edge_length", [edge()])
        .field("theta_v", [cell(), k()])
        .output([edge(), k()])
        .body(
            field("kh_smag_e")
                * field("inv_dual_edge_length")
                * sum_over(shift("theta_v", &e2c), &e2c, [-1.0, 1.0]),
        )
        .build()?)
}
