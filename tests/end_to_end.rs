//! End-to-end scenarios through the bootstrapped registry

use protean::prelude::*;
use protean::DispatchError;

fn registry() -> Registry {
    bootstrap().expect("bootstrap")
}

#[test]
fn mixed_constant_equality_promotes_and_stays_constant() {
    let registry = registry();
    let out = registry
        .call("equal", &[integral::int_const(5), integral::long_const(5)])
        .unwrap();
    // The result is itself a compile-time constant wrapping truth
    assert_eq!(out.tag(), Tag::canonical(Tag::boolean()));
    assert_eq!(registry.value(&out).unwrap(), Value::Bool(true));

    let out = registry
        .call("equal", &[integral::int_const(5), integral::long_const(6)])
        .unwrap();
    assert_eq!(registry.value(&out).unwrap(), Value::Bool(false));
}

#[test]
fn int_constant_against_string_constant_has_no_common_type() {
    let registry = registry();
    let five = integral::int_const(5);
    let text = Value::constant("str_const", Value::string("5"));
    let err = registry.call("equal", &[five, text]).unwrap_err();
    assert!(matches!(err, DispatchError::NoCommonType { .. }));
}

#[test]
fn transform_with_uniform_return_tag() {
    let registry = registry();
    let inc = Value::fn1("inc", |_, x| Ok(Value::I64(x.expect_i64("inc")? + 1)));
    let out = registry
        .call("transform", &[vec_seq::of_i64(&[1, 2, 3]), inc])
        .unwrap();
    assert_eq!(out, vec_seq::of_i64(&[2, 3, 4]));
}

#[test]
fn transform_with_drifting_return_tag_is_flagged() {
    let registry = registry();
    let drift = Value::fn1("drift", |_, x| {
        let n = x.expect_i64("drift")?;
        if n == 2 {
            Ok(Value::F64(n as f64))
        } else {
            Ok(Value::I64(n))
        }
    });
    let err = registry
        .call("transform", &[vec_seq::of_i64(&[1, 2, 3]), drift])
        .unwrap_err();
    assert!(matches!(err, DispatchError::NonUniformElements { .. }));
}

#[test]
fn count_if_equals_length_of_filter() {
    let registry = registry();
    let odd = || {
        Value::fn1("odd", |_, x| {
            Ok(Value::Bool(x.expect_i64("odd")? % 2 != 0))
        })
    };
    let xs = vec_seq::of_i64(&[1, 2, 3, 4, 5, 6, 7]);
    let counted = registry.call("count_if", &[xs.clone(), odd()]).unwrap();
    let filtered = registry.call("filter", &[xs, odd()]).unwrap();
    let measured = registry.call("length", &[filtered]).unwrap();
    assert_eq!(counted, measured);
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let registry = registry();
    let pair = |key: i64, label: &str| {
        vec_seq::vec_seq(vec![Value::I64(key), Value::string(label)])
    };
    let xs = vec_seq::vec_seq(vec![pair(1, "a"), pair(1, "b"), pair(0, "c")]);
    let by_key = Value::fn2("by_key", |registry, x, y| {
        let kx = x.expect_seq("by_key")?[0].clone();
        let ky = y.expect_seq("by_key")?[0].clone();
        registry.call("less", &[kx, ky])
    });
    let out = registry.call("sort_by", &[xs, by_key]).unwrap();
    assert_eq!(
        out,
        vec_seq::vec_seq(vec![pair(0, "c"), pair(1, "a"), pair(1, "b")])
    );
}

#[test]
fn constant_round_trip() {
    let registry = registry();
    for c in [integral::int_const(0), integral::int_const(-3)] {
        let payload = registry.value(&c).unwrap();
        let rewrapped = Value::constant(integral::INT_CONST, payload);
        let eq = registry.call("equal", &[rewrapped, c]).unwrap();
        assert_eq!(registry.value(&eq).unwrap(), Value::Bool(true));
    }
}

#[test]
fn minimal_fold_family_gains_the_derived_surface() {
    let registry = {
        let mut builder = RegistryBuilder::new();
        protean::engine::constant::install(&mut builder).unwrap();
        protean::concepts::install(&mut builder).unwrap();
        builder
            .implement("fold", Tag::named("mini"), "mini::fold", |registry, _, args| {
                let items = args[0].expect_seq("fold")?;
                let f = args[2].expect_fn("fold")?;
                let mut acc = args[1].clone();
                for item in items {
                    acc = f.invoke(registry, &[acc, item.clone()])?;
                }
                Ok(acc)
            })
            .unwrap();
        builder
            .implement("is_empty", Tag::named("mini"), "mini::is_empty", |_, _, args| {
                Ok(Value::Bool(args[0].expect_seq("is_empty")?.is_empty()))
            })
            .unwrap();
        builder.finalize().unwrap()
    };

    let tag = Tag::named("mini");
    assert!(registry.models("Foldable", &tag).unwrap());

    let xs = Value::seq(
        tag,
        vec![Value::I64(4), Value::I64(1), Value::I64(1), Value::I64(9)],
    );
    assert_eq!(
        registry.call("length", &[xs.clone()]).unwrap(),
        Value::I64(4)
    );
    let positive = Value::fn1("positive", |_, x| {
        Ok(Value::Bool(x.expect_i64("positive")? > 0))
    });
    assert_eq!(
        registry.call("any_of", &[xs.clone(), positive]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(registry.call("minimum", &[xs]).unwrap(), Value::I64(1));
}

#[test]
fn models_is_false_without_primitives_and_never_errors() {
    let registry = registry();
    let opaque = Tag::named("opaque");
    for concept in ["Foldable", "Comparable", "Orderable", "Sequence", "Constant"] {
        assert!(!registry.models(concept, &opaque).unwrap());
    }
    // Errors are deferred to use
    let err = registry
        .call("length", &[Value::seq(opaque, vec![])])
        .unwrap_err();
    assert!(matches!(err, DispatchError::NoModel { .. }));
}
