// src/model/elements.rs

/// Per-element scattering parameters: (charge, width).
///
/// Charge is the atomic number Z, which sets the amplitude of the
/// Gaussian form factor; width is the FWHM-like spread in Angstroms
/// (covalent radius), which sets its decay constant. Returns `None`
/// for symbols outside the table so callers can surface a lookup
/// error instead of scattering off a dummy atom.
pub fn scattering_params(element: &str) -> Option<(f64, f64)> {
    let (charge, width) = match element {
        // --- Period 1 ---
        "H" => (1.0, 0.37),
        "He" => (2.0, 0.32),
        // --- Period 2 ---
        "Li" => (3.0, 1.34),
        "Be" => (4.0, 0.90),
        "B" => (5.0, 0.82),
        "C" => (6.0, 0.77),
        "N" => (7.0, 0.75),
        "O" => (8.0, 0.73),
        "F" => (9.0, 0.71),
        "Ne" => (10.0, 0.69),
        // --- Period 3 ---
        "Na" => (11.0, 1.54),
        "Mg" => (12.0, 1.30),
        "Al" => (13.0, 1.18),
        "Si" => (14.0, 1.11),
        "P" => (15.0, 1.06),
        "S" => (16.0, 1.02),
        "Cl" => (17.0, 0.99),
        "Ar" => (18.0, 0.97),
        // --- Period 4 ---
        "K" => (19.0, 1.96),
        "Ca" => (20.0, 1.74),
        "Sc" => (21.0, 1.44),
        "Ti" => (22.0, 1.36),
        "V" => (23.0, 1.25),
        "Cr" => (24.0, 1.27),
        "Mn" => (25.0, 1.39),
        "Fe" => (26.0, 1.25),
        "Co" => (27.0, 1.26),
        "Ni" => (28.0, 1.21),
        "Cu" => (29.0, 1.38),
        "Zn" => (30.0, 1.31),
        "Ga" => (31.0, 1.26),
        "Ge" => (32.0, 1.22),
        "As" => (33.0, 1.19),
        "Se" => (34.0, 1.16),
        "Br" => (35.0, 1.14),
        "Kr" => (36.0, 1.10),
        // --- Period 5 (selected) ---
        "Rb" => (37.0, 2.11),
        "Sr" => (38.0, 1.92),
        "Y" => (39.0, 1.62),
        "Zr" => (40.0, 1.48),
        "Nb" => (41.0, 1.37),
        "Mo" => (42.0, 1.45),
        "Ru" => (44.0, 1.26),
        "Rh" => (45.0, 1.35),
        "Pd" => (46.0, 1.31),
        "Ag" => (47.0, 1.53),
        "Cd" => (48.0, 1.48),
        "In" => (49.0, 1.44),
        "Sn" => (50.0, 1.41),
        "Sb" => (51.0, 1.38),
        "Te" => (52.0, 1.35),
        "I" => (53.0, 1.33),
        "Xe" => (54.0, 1.30),
        // --- Period 6 (selected) ---
        "Cs" => (55.0, 2.25),
        "Ba" => (56.0, 1.98),
        "W" => (74.0, 1.46),
        "Ir" => (77.0, 1.37),
        "Pt" => (78.0, 1.28),
        "Au" => (79.0, 1.44),
        "Hg" => (80.0, 1.49),
        "Tl" => (81.0, 1.48),
        "Pb" => (82.0, 1.47),
        "Bi" => (83.0, 1.46),
        "U" => (92.0, 1.96),
        _ => return None,
    };
    Some((charge, width))
}

/// Fix casing issues from upper-cased file formats ("FE" -> "Fe").
pub fn normalize_symbol(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    match chars.next() {
        Some(first) => {
            first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
        }
        None => String::new(),
    }
}
