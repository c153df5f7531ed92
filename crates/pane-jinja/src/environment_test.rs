use super::*;
use minijinja::context;

fn env_with_registry() -> (PaneEnvironment, InlineTemplateRegistry) {
    let registry = InlineTemplateRegistry::new();
    (PaneEnvironment::with_registry(registry.clone()), registry)
}

#[test]
fn test_render_plain_document() {
    let env = PaneEnvironment::default();
    let result = env.render("Hello {{ name }}!", context! { name => "World" }).unwrap();
    assert_eq!(result, "Hello World!");
}

#[test]
fn test_definition_visible_after_parse() {
    let (env, registry) = env_with_registry();
    env.parse("{% template greeting %}Hi {{ name }}{% endtemplate %}")
        .unwrap();

    assert!(registry.has_template("greeting"));
    assert_eq!(
        registry.read_template_file("greeting").unwrap(),
        "Hi {{ name }}"
    );
}

#[test]
fn test_definition_emits_no_output() {
    let env = PaneEnvironment::default();
    let result = env
        .render("{% template card %}<b>{{ title }}</b>{% endtemplate %}", ())
        .unwrap();
    assert_eq!(result, "");
}

#[test]
fn test_define_then_render() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template card %}<b>{{ title }}</b>{% endtemplate %}[{% render \"card\", title: \"Hi\" %}]",
            (),
        )
        .unwrap();
    assert_eq!(result, "[<b>Hi</b>]");
}

#[test]
fn test_partial_output_is_not_escaped_twice() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template card %}<i>{{ label }}</i>{% endtemplate %}{% render 'card', label: 'x' %}",
            (),
        )
        .unwrap();
    assert_eq!(result, "<i>x</i>");
}

#[test]
fn test_partial_scope_is_isolated() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template p %}[{{ foo }}|{{ data.x }}]{% endtemplate %}{% render 'p' %}",
            context! { foo => "secret", data => context! { x => 1 } },
        )
        .unwrap();
    assert_eq!(result, "[|1]");
}

#[test]
fn test_whitelisted_variables_are_forwarded() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template p %}{{ trmnl }}{{ size }}{{ other }}{{ config }}{% endtemplate %}{% render 'p' %}",
            context! { trmnl => "T", size => "S", other => "O" },
        )
        .unwrap();
    assert_eq!(result, "TS");
}

#[test]
fn test_explicit_argument_overrides_forwarded() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template p %}{{ size }}{% endtemplate %}{% render 'p', size: 'big' %}",
            context! { size => "small" },
        )
        .unwrap();
    assert_eq!(result, "big");
}

#[test]
fn test_arguments_are_evaluated_in_caller_scope() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template p %}{{ title }}/{{ count }}{% endtemplate %}{% render 'p', title: page.title | upper, count: items | length %}",
            context! { page => context! { title => "news" }, items => vec![1, 2, 3] },
        )
        .unwrap();
    assert_eq!(result, "NEWS/3");
}

#[test]
fn test_with_binding_uses_template_base_name() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template widgets/user %}{{ user.name }}{% endtemplate %}{% render 'widgets/user' with person %}",
            context! { person => context! { name => "ada" } },
        )
        .unwrap();
    assert_eq!(result, "ada");
}

#[test]
fn test_binding_overrides_explicit_argument() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template p %}{{ v }}{% endtemplate %}{% render 'p' with 'bound' as v, v: 'explicit' %}",
            (),
        )
        .unwrap();
    assert_eq!(result, "bound");
}

#[test]
fn test_for_binding_renders_each_element() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template row %}{{ forloop.index }}:{{ item }}{% if not forloop.last %},{% endif %}{% endtemplate %}{% render 'row' for items as item %}",
            context! { items => vec!["a", "b", "c"] },
        )
        .unwrap();
    assert_eq!(result, "1:a,2:b,3:c");
}

#[test]
fn test_for_binding_with_scalar_renders_once() {
    let env = PaneEnvironment::default();
    let result = env
        .render(
            "{% template row %}<{{ row }}>{% endtemplate %}{% render 'row' for value %}",
            context! { value => 5 },
        )
        .unwrap();
    assert_eq!(result, "<5>");
}

#[test]
fn test_nested_partials() {
    let env = PaneEnvironment::default();
    let document = "\
{% template inner %}({{ label }}:{{ data.n }}){% endtemplate %}\
{% template outer %}{% render 'inner', label: title %}{% endtemplate %}\
{% render 'outer', title: 'x' %}";
    let result = env.render(document, context! { data => context! { n => 2 } }).unwrap();
    assert_eq!(result, "(x:2)");
}

#[test]
fn test_whitespace_control_on_tags() {
    let env = PaneEnvironment::default();
    let document = "a\n{%- template p -%}\n  P  \n{%- endtemplate -%}\n{%- render 'p' -%}\nb";
    assert_eq!(env.render(document, ()).unwrap(), "aPb");
}

#[test]
fn test_invalid_template_name_is_syntax_error() {
    let env = PaneEnvironment::default();
    let result = env.render("{% template invalid-name %}x{% endtemplate %}", ());
    assert!(matches!(result, Err(TemplateError::Syntax { .. })));
}

#[test]
fn test_missing_partial_is_not_found() {
    let env = PaneEnvironment::default();
    let result = env.render("before {% render 'missing' %}", ());
    assert_eq!(
        result,
        Err(TemplateError::NotFound {
            name: "missing".to_string()
        })
    );
}

#[test]
fn test_syntax_error_inside_partial_propagates() {
    let (env, registry) = env_with_registry();
    registry.register("bad", "{% render unquoted %}");
    let result = env.render_in_pass("{% render 'bad' %}", ());
    assert!(matches!(result, Err(TemplateError::Syntax { .. })));
}

#[test]
fn test_self_recursion_hits_depth_limit() {
    let config = Config {
        max_partial_depth: 4,
        ..Config::default()
    };
    let env = PaneEnvironment::with_source(Arc::new(InlineTemplateRegistry::new()), &config);
    let result = env.render(
        "{% template loop %}x{% render 'loop' %}{% endtemplate %}{% render 'loop' %}",
        (),
    );
    assert_eq!(
        result,
        Err(TemplateError::RecursionLimit {
            name: "loop".to_string(),
            limit: 4
        })
    );

    // The depth counter is released after a failed render.
    let ok = env
        .render("{% template p %}ok{% endtemplate %}{% render 'p' %}", ())
        .unwrap();
    assert_eq!(ok, "ok");
}

#[test]
fn test_bounded_recursion_within_limit() {
    let env = PaneEnvironment::default();
    let document = "\
{% template countdown %}{{ n }}{% if n > 0 %}{% render 'countdown', n: n - 1 %}{% endif %}{% endtemplate %}\
{% render 'countdown', n: 3 %}";
    assert_eq!(env.render(document, ()).unwrap(), "3210");
}

#[test]
fn test_rerender_is_idempotent() {
    let (env, registry) = env_with_registry();
    let document = "{% template card %}<{{ v }}>{% endtemplate %}{% render 'card', v: data.v %}";
    let ctx = context! { data => context! { v => 7 } };

    let first = env.render(document, &ctx).unwrap();
    let first_state = registry.snapshot();
    let second = env.render(document, &ctx).unwrap();

    assert_eq!(first, "<7>");
    assert_eq!(first, second);
    assert_eq!(first_state, registry.snapshot());
}

#[test]
fn test_render_resets_registry_between_passes() {
    let (env, registry) = env_with_registry();
    env.render("{% template a %}A{% endtemplate %}", ()).unwrap();
    assert!(registry.has_template("a"));

    env.render("{% template b %}B{% endtemplate %}", ()).unwrap();
    assert!(!registry.has_template("a"));
    assert_eq!(registry.template_names(), vec!["b"]);

    let result = env.render("{% render 'b' %}", ());
    assert!(matches!(result, Err(TemplateError::NotFound { .. })));
}

#[test]
fn test_render_in_pass_keeps_definitions() {
    let env = PaneEnvironment::default();
    env.render("{% template shared %}S{% endtemplate %}", ()).unwrap();
    let result = env.render_in_pass("{% render 'shared' %}", ()).unwrap();
    assert_eq!(result, "S");
}

#[test]
fn test_directory_source_definitions_are_noops() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("card.html"), "<i>{{ title }}</i>").unwrap();

    let config = Config {
        templates_dir: Some(dir.path().display().to_string()),
        ..Config::default()
    };
    let env = PaneEnvironment::from_config(&config, Path::new("."));
    assert!(env.registry().is_none());

    let result = env
        .render(
            "{% template card %}OVERRIDE{% endtemplate %}{% render 'card', title: 'x' %}",
            (),
        )
        .unwrap();
    assert_eq!(result, "<i>x</i>");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("card.html")).unwrap(),
        "<i>{{ title }}</i>"
    );
}

#[test]
fn test_strict_undefined() {
    let config = Config {
        strict_undefined: true,
        ..Config::default()
    };
    let env = PaneEnvironment::with_source(Arc::new(InlineTemplateRegistry::new()), &config);
    let result = env.render("{{ missing }}", ());
    assert!(matches!(result, Err(TemplateError::Render(_))));
}

#[test]
fn test_condition_filters() {
    let env = PaneEnvironment::default();
    let users = serde_json::json!([
        {"name": "ada", "age": 35, "role": "admin"},
        {"name": "bob", "age": 25, "role": "user"}
    ]);
    let result = env
        .render(
            "{{ users | where_exp('u', 'u.age >= 30') | map(attribute='name') | join(',') }};{{ (users | find_exp('u', 'u.role == user')).name }}",
            context! { users => users },
        )
        .unwrap();
    assert_eq!(result, "ada;bob");
}

#[test]
fn test_parse_lists_definitions() {
    let env = PaneEnvironment::default();
    let parsed = env
        .parse("{% template a %}1{% endtemplate %}{% template b/c %}2{% endtemplate %}")
        .unwrap();
    let names: Vec<&str> = parsed.definitions.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b/c"]);
}

#[test]
fn test_concurrent_renders_track_depth_separately() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("countdown.html"),
        "{{ n }}{% if n > 0 %}{% render 'countdown', n: n - 1 %}{% endif %}",
    )
    .unwrap();

    let config = Config {
        templates_dir: Some(dir.path().display().to_string()),
        max_partial_depth: 4,
        ..Config::default()
    };
    let env = PaneEnvironment::from_config(&config, Path::new("."));

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    (0..20)
                        .map(|_| env.render("{% render 'countdown', n: 3 %}", ()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for result in handle.join().unwrap() {
                assert_eq!(result.unwrap(), "3210");
            }
        }
    });
}
