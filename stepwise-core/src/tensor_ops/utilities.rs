use std::vec::Vec;

use crate::{
    dtypes::Dtype,
    tensor::{Error, Merge, Tape, Tensor},
};

/// Applies `f` to every element. Backward accumulates `df(x) * grad_out`.
pub(crate) fn try_unary_op<E, T, F, DF>(
    inp: Tensor<E, T>,
    f: F,
    df: DF,
) -> Result<Tensor<E, T>, Error>
where
    E: Dtype,
    T: Tape<E>,
    F: Fn(E) -> E,
    DF: 'static + Fn(E) -> E,
{
    let (inp, mut tape) = inp.split_tape();
    let data: Vec<E> = inp.data.iter().map(|x| f(*x)).collect();
    let out = inp.device.wrap(data, inp.shape.clone());
    if T::OWNS_TAPE {
        let inp_ghost = inp.ghost();
        let out_ghost = out.ghost();
        let x = inp.data;
        tape.add_backward_op(move |grads| {
            grads.backprop(&inp_ghost, &out_ghost, |grad_inp, grad_out| {
                for ((gi, go), x) in grad_inp.iter_mut().zip(grad_out).zip(x.iter()) {
                    *gi += df(*x) * *go;
                }
            })
        });
    }
    Ok(out.put_tape(tape))
}

/// Applies `f` to every pair of elements of two tensors with the same shape.
/// Backward accumulates `dfl(x, y) * grad_out` into `lhs` and, when `rhs`
/// carries a tape, `dfr(x, y) * grad_out` into `rhs`.
pub(crate) fn try_binary_op<E, L, R, F, DFL, DFR>(
    lhs: Tensor<E, L>,
    rhs: Tensor<E, R>,
    f: F,
    dfl: DFL,
    dfr: DFR,
) -> Result<Tensor<E, L>, Error>
where
    E: Dtype,
    L: Tape<E> + Merge<R>,
    R: Tape<E>,
    F: Fn(E, E) -> E,
    DFL: 'static + Fn(E, E) -> E,
    DFR: 'static + Fn(E, E) -> E,
{
    if lhs.shape != rhs.shape {
        return Err(Error::ShapeMismatch {
            expected: lhs.shape,
            found: rhs.shape,
        });
    }
    let (lhs, ltape) = lhs.split_tape();
    let (rhs, rtape) = rhs.split_tape();
    let mut tape = ltape.merge(rtape);
    let data: Vec<E> = lhs
        .data
        .iter()
        .zip(rhs.data.iter())
        .map(|(x, y)| f(*x, *y))
        .collect();
    let out = lhs.device.wrap(data, lhs.shape.clone());
    if L::OWNS_TAPE {
        let lhs_ghost = lhs.ghost();
        // an untaped rhs is a constant and gets no gradient
        let rhs_ghost = R::OWNS_TAPE.then(|| rhs.ghost());
        let out_ghost = out.ghost();
        let (x, y) = (lhs.data, rhs.data);
        tape.add_backward_op(move |grads| {
            grads.backprop(&lhs_ghost, &out_ghost, |grad_lhs, grad_out| {
                for (i, (gl, go)) in grad_lhs.iter_mut().zip(grad_out).enumerate() {
                    *gl += dfl(x[i], y[i]) * *go;
                }
            })?;
            if let Some(rhs_ghost) = rhs_ghost {
                grads.backprop(&rhs_ghost, &out_ghost, |grad_rhs, grad_out| {
                    for (i, (gr, go)) in grad_rhs.iter_mut().zip(grad_out).enumerate() {
                        *gr += dfr(x[i], y[i]) * *go;
                    }
                })?;
            }
            Ok(())
        });
    }
    Ok(out.put_tape(tape))
}

/// Reduces all elements to a scalar with `f`. Backward accumulates
/// `scale * grad_out` into every element of `inp`.
pub(crate) fn try_reduce_all<E, T, F>(inp: Tensor<E, T>, f: F, scale: E) -> Result<Tensor<E, T>, Error>
where
    E: Dtype,
    T: Tape<E>,
    F: Fn(&[E]) -> E,
{
    let (inp, mut tape) = inp.split_tape();
    let out = inp
        .device
        .wrap(vec![f(inp.data.as_slice())], crate::shapes::Shape::scalar());
    if T::OWNS_TAPE {
        let inp_ghost = inp.ghost();
        let out_ghost = out.ghost();
        tape.add_backward_op(move |grads| {
            grads.backprop(&inp_ghost, &out_ghost, |grad_inp, grad_out| {
                let g = grad_out[0] * scale;
                for gi in grad_inp.iter_mut() {
                    *gi += g;
                }
            })
        });
    }
    Ok(out.put_tape(tape))
}
