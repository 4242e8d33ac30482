//! Cook-Torrance reflectance for rough dielectrics.
//!
//! Beckmann normal distribution, exact dielectric Fresnel and the Smith
//! shadow-masking term with Walter's rational approximation, plus a
//! Lambertian diffuse lobe. Every term is clamped to its physical bound
//! instead of producing NaN or infinity at grazing angles.

use std::f32::consts::PI;

use lumen_core::{Color, Material};
use lumen_math::Vec3;

/// Cosines below this are treated as grazing.
const GRAZING_EPSILON: f32 = 1e-6;

/// Above this `b` the Smith G1 approximation is 1.
const G1_CUTOFF: f32 = 1.6;

/// The cosines the reflectance terms are evaluated with.
///
/// `L` points toward the light, `V` toward the viewer, `N` is the shading
/// normal and `H` the half-vector `normalize(V + L)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadingCosines {
    pub l_dot_h: f32,
    pub n_dot_h: f32,
    pub v_dot_h: f32,
    pub l_dot_n: f32,
    pub v_dot_n: f32,
}

impl ShadingCosines {
    /// Compute the cosines from unit vectors.
    ///
    /// Returns `None` when `V + L` vanishes (light exactly opposite the
    /// viewer) and the half-vector is undefined.
    pub fn new(n: Vec3, v: Vec3, l: Vec3) -> Option<Self> {
        let h = (v + l).try_normalize()?;
        Some(Self {
            l_dot_h: l.dot(h),
            n_dot_h: n.dot(h),
            v_dot_h: v.dot(h),
            l_dot_n: l.dot(n),
            v_dot_n: v.dot(n),
        })
    }
}

/// Beckmann normal distribution `D`.
pub fn beckmann(n_dot_h: f32, alpha: f32) -> f32 {
    if n_dot_h <= GRAZING_EPSILON || alpha <= 0.0 {
        return 0.0;
    }

    let cos2_theta = n_dot_h * n_dot_h;
    let cos4_theta = cos2_theta * cos2_theta;
    let tan2_theta = (1.0 - cos2_theta) / cos2_theta;
    let alpha2 = alpha * alpha;

    (-tan2_theta / alpha2).exp() / (PI * alpha2 * cos4_theta)
}

/// Exact unpolarized Fresnel reflectance of a dielectric interface.
///
/// `cos_theta_i` is the cosine between the incident direction and the
/// (micro)normal; light travels from `ext_ior` into `int_ior`. Returns 1 on
/// total internal reflection.
pub fn fresnel(cos_theta_i: f32, ext_ior: f32, int_ior: f32) -> f32 {
    let cos_i = cos_theta_i.abs().min(1.0);
    let eta = ext_ior / int_ior;
    let sin2_theta_t = eta * eta * (1.0 - cos_i * cos_i);

    if sin2_theta_t > 1.0 {
        return 1.0;
    }

    let cos_t = (1.0 - sin2_theta_t).sqrt();

    let rs_den = ext_ior * cos_i + int_ior * cos_t;
    let rp_den = ext_ior * cos_t + int_ior * cos_i;
    if rs_den <= 0.0 || rp_den <= 0.0 {
        return 1.0;
    }

    let rs = ((ext_ior * cos_i - int_ior * cos_t) / rs_den).powi(2);
    let rp = ((ext_ior * cos_t - int_ior * cos_i) / rp_den).powi(2);

    (0.5 * (rs + rp)).clamp(0.0, 1.0)
}

/// Step function: 1 for positive arguments, else 0.
#[inline]
pub fn chi_plus(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Smith masking for one direction `D` (light or view).
pub fn smith_g1(d_dot_h: f32, d_dot_n: f32, alpha: f32) -> f32 {
    if d_dot_n <= 0.0 {
        return 0.0;
    }

    // Facing away from the microfacet normal
    let gate = chi_plus(d_dot_h / d_dot_n);
    if gate == 0.0 {
        return 0.0;
    }

    let cos_theta = d_dot_n.min(1.0);
    let tan_theta = (1.0 - cos_theta * cos_theta).sqrt() / cos_theta;
    let b = 1.0 / (alpha * tan_theta);

    // Also covers b = inf (normal incidence or alpha = 0)
    if b >= G1_CUTOFF {
        return gate;
    }

    let g1 = (3.535 * b + 2.181 * b * b) / (1.0 + 2.276 * b + 2.577 * b * b);
    gate * g1.clamp(0.0, 1.0)
}

/// Combined shadow-masking `G = G1(L) * G1(V)`.
pub fn smith_g(cosines: &ShadingCosines, alpha: f32) -> f32 {
    smith_g1(cosines.l_dot_h, cosines.l_dot_n, alpha) * smith_g1(cosines.v_dot_h, cosines.v_dot_n, alpha)
}

/// Microfacet specular lobe `specular * D * F * G / (4 (L.N) (V.N))`.
pub fn specular_term(cosines: &ShadingCosines, material: &Material) -> Color {
    let denominator = 4.0 * cosines.l_dot_n * cosines.v_dot_n;
    if denominator <= GRAZING_EPSILON {
        return Color::ZERO;
    }

    let d = beckmann(cosines.n_dot_h, material.roughness);
    let f = fresnel(cosines.l_dot_h, 1.0, material.ior);
    let g = smith_g(cosines, material.roughness);

    material.specular_color * (d * f * g / denominator)
}

/// Lambertian lobe `diffuse / pi`.
pub fn diffuse_term(material: &Material) -> Color {
    material.diffuse_color / PI
}

/// Full BRDF `f_d + f_s`.
pub fn evaluate(cosines: &ShadingCosines, material: &Material) -> Color {
    diffuse_term(material) + specular_term(cosines, material)
}

/// Radiance reflected toward `v` from a light of color `light_color` in direction `l`.
///
/// `(f_d + f_s) * light_color * (L.N)`; zero for lights behind the surface.
pub fn shade(n: Vec3, v: Vec3, l: Vec3, light_color: Color, material: &Material) -> Color {
    let l_dot_n = n.dot(l);
    if l_dot_n <= 0.0 {
        return Color::ZERO;
    }

    let brdf = match ShadingCosines::new(n, v, l) {
        Some(cosines) => evaluate(&cosines, material),
        None => diffuse_term(material),
    };

    brdf * light_color * l_dot_n
}
