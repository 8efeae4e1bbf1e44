//! End-to-end validation behavior: presence, defaults, strict mode,
//! nested keyword validation, unions, and the panicking entry points.

use std::sync::Arc;

use kwval::{
    docs, expect_valid, kw, validate, KeyOptions, Schema, Type, ValidateOptions, Validator,
    ValidatorRegistry, Value,
};

fn strict() -> ValidateOptions {
    ValidateOptions::default()
}

#[test]
fn basic_pass_keeps_values_and_order() {
    let schema = Schema::builder()
        .key("foo", KeyOptions::new().is(Type::Atom))
        .key("bar", KeyOptions::new())
        .try_build()
        .unwrap();

    let input = kw![foo: Value::atom("foo"), bar: Value::atom("bar")];
    let validated = validate(&input, &schema, &strict()).unwrap();
    assert_eq!(
        validated,
        vec![
            ("foo".to_string(), Value::atom("foo")),
            ("bar".to_string(), Value::atom("bar")),
        ]
    );
}

#[test]
fn extra_keys_fail_in_strict_mode() {
    let schema = Schema::builder()
        .key("foo", KeyOptions::new())
        .try_build()
        .unwrap();

    let input = kw![
        foo: Value::atom("foo"),
        bar: Value::atom("bar"),
        baz: Value::atom("baz"),
    ];
    let errors = validate(&input, &schema, &strict()).unwrap_err();
    assert_eq!(errors.get("bar").unwrap(), &["is not a valid key".to_string()]);
    assert_eq!(errors.get("baz").unwrap(), &["is not a valid key".to_string()]);
    assert!(errors.get("foo").is_none());
    let keys: Vec<&str> = errors.keys().collect();
    assert_eq!(keys, vec!["bar", "baz"]);
}

#[test]
fn missing_required_key_is_reported() {
    let schema = Schema::builder()
        .key("foo", KeyOptions::new().required(true))
        .try_build()
        .unwrap();

    let errors = validate(&kw![], &schema, &strict()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("foo").unwrap(), &["is a required key".to_string()]);
}

#[test]
fn required_key_with_default_resolves_through_it() {
    let schema = Schema::builder()
        .key(
            "foo",
            KeyOptions::new()
                .is(Type::Atom)
                .required(true)
                .default(Value::atom("fallback")),
        )
        .try_build()
        .unwrap();

    // The default applies, so the required check sees a non-nil value.
    let validated = validate(&kw![], &schema, &strict()).unwrap();
    assert_eq!(validated, kw![foo: Value::atom("fallback")]);
}

#[test]
fn explicit_false_default_counts_as_present() {
    let schema = Schema::builder()
        .key("flag", KeyOptions::new().is(Type::Boolean).default(false))
        .try_build()
        .unwrap();

    let validated = validate(&kw![], &schema, &strict()).unwrap();
    assert_eq!(validated, kw![flag: false]);
}

#[test]
fn nested_keyword_defaults_are_filled_in() {
    let inner = Schema::builder()
        .key("foo", KeyOptions::new().is(Type::Atom))
        .key(
            "bar",
            KeyOptions::new().is(Type::Atom).default(Value::atom("bar")),
        )
        .try_build()
        .unwrap();
    let schema = Schema::builder()
        .key(
            "foo",
            KeyOptions::new().is(Type::ListOf(Box::new(Type::KeywordOf(inner)))),
        )
        .try_build()
        .unwrap();

    let input = kw![
        foo: Value::List(vec![Value::Keyword(kw![foo: Value::atom("foo")])]),
    ];
    let validated = validate(&input, &schema, &strict()).unwrap();
    assert_eq!(
        validated,
        kw![
            foo: Value::List(vec![Value::Keyword(kw![
                foo: Value::atom("foo"),
                bar: Value::atom("bar"),
            ])]),
        ]
    );
}

#[test]
fn union_failure_uses_the_descriptor_rendering() {
    let schema = Schema::builder()
        .key(
            "foo",
            KeyOptions::new().is(Type::OneOf(vec![Type::Atom, Type::Binary])),
        )
        .try_build()
        .unwrap();

    let errors = validate(&kw![foo: 0], &schema, &strict()).unwrap_err();
    assert_eq!(
        errors.get("foo").unwrap(),
        &["must be one of the following: [Atom, Binary]".to_string()]
    );
}

#[test]
fn nested_failures_collapse_to_one_message() {
    let inner = Schema::builder()
        .key("foo", KeyOptions::new().is(Type::Atom).required(true))
        .try_build()
        .unwrap();
    let schema = Schema::builder()
        .key("opts", KeyOptions::new().is(Type::KeywordOf(inner)))
        .try_build()
        .unwrap();

    let errors =
        validate(&kw![opts: Value::Keyword(kw![])], &schema, &strict()).unwrap_err();
    assert_eq!(
        errors.get("opts").unwrap(),
        &["must be a keyword with structure: [foo: Atom]".to_string()]
    );
}

#[test]
fn expect_valid_returns_the_validated_list() {
    let schema = Schema::builder()
        .key("foo", KeyOptions::new().is(Type::Atom))
        .try_build()
        .unwrap();
    let validated = expect_valid(&kw![foo: Value::atom("x")], &schema, &strict());
    assert_eq!(validated, kw![foo: Value::atom("x")]);
}

#[test]
fn expect_valid_panics_with_the_full_report() {
    let schema = Schema::builder()
        .key("foo", KeyOptions::new().is(Type::Atom))
        .try_build()
        .unwrap();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        expect_valid(&kw![foo: 0], &schema, &ValidateOptions::default());
    }));
    let payload = result.unwrap_err();
    let message = payload.downcast_ref::<String>().unwrap();
    assert_eq!(
        message,
        "Invalid keyword given.\n\nKeyword:\n\n[foo: 0]\n\nInvalid:\n\nfoo: [\"must be an atom\"]"
    );
}

#[test]
fn registry_backed_validators_run_in_declared_order() {
    let mut registry = ValidatorRegistry::new();
    registry
        .register("Checks", "even", |_key, value| match value {
            Value::Int(n) if n % 2 == 0 => Vec::new(),
            _ => vec!["must be even".to_string()],
        })
        .unwrap();

    let schema = Schema::builder()
        .key(
            "count",
            KeyOptions::new()
                .is(Type::Integer)
                .custom(|_key, value| match value {
                    Value::Int(n) if *n > 0 => Vec::new(),
                    _ => vec!["must be positive".to_string()],
                })
                .custom_named("Checks", "even"),
        )
        .try_build()
        .unwrap();

    let opts = ValidateOptions::default().with_registry(Arc::new(registry));
    assert!(validate(&kw![count: 2], &schema, &opts).is_ok());

    let errors = validate(&kw![count: -1], &schema, &opts).unwrap_err();
    assert_eq!(
        errors.get("count").unwrap(),
        &["must be positive".to_string(), "must be even".to_string()]
    );
}

#[test]
fn raw_value_schemas_build_like_builder_schemas() {
    // The raw keyword form is the canonical construction path; the builder
    // is sugar over it.
    let raw = Value::Keyword(kw![
        foo: Value::Keyword(kw![
            is: Value::Type(Box::new(Type::Atom)),
            required: true,
        ]),
    ]);
    let from_raw = Schema::new(&raw);
    let from_builder = Schema::builder()
        .key("foo", KeyOptions::new().is(Type::Atom).required(true))
        .build();
    assert_eq!(from_raw, from_builder);
}

#[test]
fn docs_render_required_and_default_clauses() {
    let schema = Schema::builder()
        .key(
            "name",
            KeyOptions::new()
                .is(Type::Binary)
                .required(true)
                .doc("The display name."),
        )
        .key(
            "timeout",
            KeyOptions::new()
                .is(Type::Timeout)
                .default(Value::Int(5000))
                .doc("How long to wait."),
        )
        .try_build()
        .unwrap();

    assert_eq!(
        docs(&schema),
        "* `name` - Required. The display name.\n\
         * `timeout` - How long to wait. Defaults to `5000`.\n"
    );
}

#[test]
fn direct_fun_values_work_as_custom_validators() {
    // Custom validators supplied through the raw form are ordinary arity-2
    // callables returning a list of error strings.
    let check = Value::Fun(kwval::FunValue::new(2, |args| {
        match args.get(1) {
            Some(Value::Int(n)) if *n < 100 => Value::List(Vec::new()),
            _ => Value::List(vec![Value::binary("must be under 100")]),
        }
    }));
    let raw = Value::Keyword(kw![
        count: Value::Keyword(kw![
            is: Value::Type(Box::new(Type::Integer)),
            custom: Value::List(vec![check]),
        ]),
    ]);
    let schema = Schema::new(&raw);

    assert!(validate(&kw![count: 7], &schema, &strict()).is_ok());
    let errors = validate(&kw![count: 700], &schema, &strict()).unwrap_err();
    assert_eq!(
        errors.get("count").unwrap(),
        &["must be under 100".to_string()]
    );
}

#[test]
fn validator_enum_compares_named_references() {
    assert_eq!(Validator::named("M", "f"), Validator::named("M", "f"));
}
