//! Sub-matrix and vector extraction for a variable/constraint partition.
//!
//! All matrices are CSR (`sprs::CsMat<f64>`), rows are constraints and
//! columns are variables.

use std::collections::BTreeSet;

use sprs::{CsMat, TriMat};

/// Rows `rows` and columns `cols` of `mat`, in the given order
pub fn select(mat: &CsMat<f64>, rows: &[usize], cols: &[usize]) -> CsMat<f64> {
    let mut position = vec![None; mat.cols()];
    for (k, &col) in cols.iter().enumerate() {
        position[col] = Some(k);
    }

    let mut tri = TriMat::new((rows.len(), cols.len()));
    for (i, &row) in rows.iter().enumerate() {
        if let Some(view) = mat.outer_view(row) {
            for (col, &val) in view.iter() {
                if let Some(k) = position[col] {
                    tri.add_triplet(i, k, val);
                }
            }
        }
    }
    tri.to_csr()
}

/// Rows `rows` of `mat` with every column kept
pub fn select_rows(mat: &CsMat<f64>, rows: &[usize]) -> CsMat<f64> {
    let cols: Vec<usize> = (0..mat.cols()).collect();
    select(mat, rows, &cols)
}

/// Row `i` multiplied by `factors[i]`
pub fn scale_rows(mat: &CsMat<f64>, factors: &[f64]) -> CsMat<f64> {
    let mut tri = TriMat::new((mat.rows(), mat.cols()));
    for (&val, (row, col)) in mat.iter() {
        tri.add_triplet(row, col, factors[row] * val);
    }
    tri.to_csr()
}

/// `top` above `bottom`; both must have the same number of columns
pub fn vstack(top: &CsMat<f64>, bottom: &CsMat<f64>) -> CsMat<f64> {
    debug_assert_eq!(top.cols(), bottom.cols());
    let mut tri = TriMat::new((top.rows() + bottom.rows(), top.cols()));
    for (&val, (row, col)) in top.iter() {
        tri.add_triplet(row, col, val);
    }
    for (&val, (row, col)) in bottom.iter() {
        tri.add_triplet(top.rows() + row, col, val);
    }
    tri.to_csr()
}

/// All-zero matrix
pub fn zeros(rows: usize, cols: usize) -> CsMat<f64> {
    CsMat::zero((rows, cols))
}

/// Rows with a nonzero coefficient in any of `cols`
pub fn row_support(mat: &CsMat<f64>, cols: &[usize]) -> BTreeSet<usize> {
    let mut wanted = vec![false; mat.cols()];
    for &col in cols {
        wanted[col] = true;
    }
    mat.iter()
        .filter(|&(&val, (_, col))| wanted[col] && val != 0.0)
        .map(|(_, (row, _))| row)
        .collect()
}

/// `mat · x`
pub fn mul_vec(mat: &CsMat<f64>, x: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; mat.rows()];
    for (&val, (row, col)) in mat.iter() {
        out[row] += val * x[col];
    }
    out
}

/// `yᵀ · mat`
pub fn vec_mul(y: &[f64], mat: &CsMat<f64>) -> Vec<f64> {
    let mut out = vec![0.0; mat.cols()];
    for (&val, (row, col)) in mat.iter() {
        out[col] += y[row] * val;
    }
    out
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Sparse rows as `(column, value)` lists
pub fn rows(mat: &CsMat<f64>) -> Vec<Vec<(usize, f64)>> {
    let mut out = vec![Vec::new(); mat.rows()];
    for (&val, (row, col)) in mat.iter() {
        out[row].push((col, val));
    }
    out
}

/// Sparse columns as `(row, value)` lists
pub fn columns(mat: &CsMat<f64>) -> Vec<Vec<(usize, f64)>> {
    let mut out = vec![Vec::new(); mat.cols()];
    for (&val, (row, col)) in mat.iter() {
        out[col].push((row, val));
    }
    out
}
