//! Tests for the declaration scanners, driven through the real parser.

use crate::document::Document;
use crate::options::AnalyzerOptions;
use vellum_relief::{EntityKind, Privacy, ScannedEntity, WarningCode};

fn scan(source: &str) -> Document {
    scan_with(source, AnalyzerOptions::default())
}

fn scan_with(source: &str, options: AnalyzerOptions) -> Document {
    Document::parse("test.js", source, &options).unwrap()
}

fn feature<'d>(doc: &'d Document, name: &str) -> &'d ScannedEntity {
    let index = doc
        .find_feature(name)
        .unwrap_or_else(|| panic!("no feature named {name}"));
    &doc.features[index]
}

fn doc_codes(doc: &Document) -> Vec<WarningCode> {
    doc.warnings.iter().map(|w| w.code).collect()
}

fn identifiers(refs: &[vellum_relief::ScannedReference]) -> Vec<&str> {
    refs.iter().map(|r| r.identifier.as_str()).collect()
}

#[test]
fn test_plain_class_with_constructor_property() {
    let doc = scan(
        r#"
class Foo {
  constructor() {
    /** @public The x. */
    this.x = 1;
  }
}
"#,
    );
    assert_eq!(doc.features.len(), 1);
    let foo = &doc.features[0];
    assert_eq!(foo.kind, EntityKind::Class);
    assert_eq!(foo.name.as_deref(), Some("Foo"));

    let x = &foo.properties["x"];
    assert_eq!(x.description, "The x.");
    assert_eq!(x.default_value.as_deref(), Some("1"));
    assert_eq!(x.privacy, Privacy::Public);
    assert_eq!(x.type_.as_deref(), Some("number"));
    assert!(!x.is_published());
}

#[test]
fn test_constructor_string_defaults_infer_type() {
    let doc = scan(
        r#"
class Foo {
  constructor() {
    this.label = 'hi';
    this.greeting = `hello`;
    this.count = -1;
  }
}
"#,
    );
    let foo = feature(&doc, "Foo");
    let label = &foo.properties["label"];
    assert_eq!(label.default_value.as_deref(), Some("'hi'"));
    assert_eq!(label.type_.as_deref(), Some("string"));
    assert_eq!(foo.properties["greeting"].type_.as_deref(), Some("string"));
    assert_eq!(foo.properties["count"].type_.as_deref(), Some("number"));
}

#[test]
fn test_registration_makes_an_element() {
    let doc = scan(
        r#"
class Foo extends HTMLElement {}
class Plain {}
customElements.define('x-foo', Foo);
"#,
    );
    let foo = feature(&doc, "Foo");
    assert_eq!(foo.kind, EntityKind::Element);
    assert_eq!(foo.tag_name.as_deref(), Some("x-foo"));
    assert_eq!(feature(&doc, "Plain").kind, EntityKind::Class);
    // Elements come first.
    assert_eq!(doc.features[0].name.as_deref(), Some("Foo"));
}

#[test]
fn test_registration_spellings_and_inline_class() {
    let doc = scan(
        r#"
window.customElements.define('x-inline', class extends HTMLElement {});
globalThis.customElements.define('x-global', Global);
class Global {}
"#,
    );
    let elements: Vec<&ScannedEntity> = doc
        .features
        .iter()
        .filter(|f| f.kind == EntityKind::Element)
        .collect();
    assert_eq!(elements.len(), 2);
    assert!(elements
        .iter()
        .any(|e| e.name.is_none() && e.tag_name.as_deref() == Some("x-inline")));
    assert_eq!(feature(&doc, "Global").tag_name.as_deref(), Some("x-global"));
}

#[test]
fn test_tag_from_static_is() {
    let doc = scan(
        r#"
class Foo extends HTMLElement {
  static get is() { return 'x-foo'; }
}
customElements.define(Foo.is, Foo);
"#,
    );
    let foo = feature(&doc, "Foo");
    assert_eq!(foo.kind, EntityKind::Element);
    assert_eq!(foo.tag_name.as_deref(), Some("x-foo"));
}

#[test]
fn test_unreadable_registration_is_ignored() {
    let doc = scan(
        r#"
class Foo {}
customElements.define(tagName, Foo);
customElements.define('x-bar', makeClass());
"#,
    );
    assert_eq!(feature(&doc, "Foo").kind, EntityKind::Class);
    assert_eq!(
        doc_codes(&doc),
        vec![
            WarningCode::CouldNotDetermineTagName,
            WarningCode::CouldNotDetermineElement
        ]
    );
}

#[test]
fn test_registration_of_unknown_class_is_reported() {
    let doc = scan(
        r#"
var Foo = window.makeFoo();
customElements.define('x-foo', Foo);
"#,
    );
    assert!(doc.features.is_empty());
    assert_eq!(doc_codes(&doc), vec![WarningCode::CouldNotDetermineElement]);
    let warning = &doc.warnings[0];
    assert!(warning.message.contains("x-foo"));
    assert_eq!(warning.range.start.line, 2);
}

#[test]
fn test_tag_only_elements() {
    let doc = scan(
        r#"
/** @customElement x-tagged */
class Tagged extends HTMLElement {}

/** @polymerElement */
function LegacyThing() {}

/** @customElement */
var Declared;
"#,
    );
    let tagged = feature(&doc, "Tagged");
    assert_eq!(tagged.kind, EntityKind::Element);
    assert_eq!(tagged.tag_name.as_deref(), Some("x-tagged"));
    assert_eq!(feature(&doc, "LegacyThing").kind, EntityKind::Element);
    assert_eq!(feature(&doc, "Declared").kind, EntityKind::Element);
}

#[test]
fn test_namespaced_names() {
    let doc = scan(
        r#"
App.Foo = class {};

/** @memberof Lib */
class Bar {}
"#,
    );
    let foo = feature(&doc, "App.Foo");
    assert_eq!(foo.name.as_deref(), Some("Foo"));
    assert_eq!(feature(&doc, "Lib.Bar").name.as_deref(), Some("Bar"));
}

#[test]
fn test_assigned_class_is_counted_once() {
    let doc = scan("const A = class Inner {};\nNS.B = class {};\n");
    assert_eq!(doc.features.len(), 2);
    assert!(doc.find_feature("Inner").is_none());
}

#[test]
fn test_heritage_forms() {
    let doc = scan(
        r#"
class A extends window.Base {}
class B extends M1(M2(self.Base)) {}
class C extends Polymer.mixinBehaviors([B1, NS.B2], Polymer.Element) {}
/** @extends Other */
class D extends Base {}
/**
 * @mixes Extra
 * @appliesMixin M1
 */
class E extends M1(Base) {}
"#,
    );
    let a = feature(&doc, "A");
    assert_eq!(a.superclass.as_ref().map(|r| r.identifier.as_str()), Some("Base"));

    let b = feature(&doc, "B");
    assert_eq!(identifiers(&b.mixins), vec!["M1", "M2"]);
    assert_eq!(b.superclass.as_ref().map(|r| r.identifier.as_str()), Some("Base"));

    let c = feature(&doc, "C");
    assert_eq!(identifiers(&c.behaviors), vec!["B1", "NS.B2"]);
    assert_eq!(
        c.superclass.as_ref().map(|r| r.identifier.as_str()),
        Some("Polymer.Element")
    );

    let d = feature(&doc, "D");
    assert_eq!(d.superclass.as_ref().map(|r| r.identifier.as_str()), Some("Other"));

    let e = feature(&doc, "E");
    assert_eq!(identifiers(&e.mixins), vec!["M1", "Extra"]);
}

#[test]
fn test_extends_tag_without_name() {
    let doc = scan("/** @extends */\nclass A {}\n");
    let codes: Vec<WarningCode> = feature(&doc, "A").warnings.iter().map(|w| w.code).collect();
    assert_eq!(codes, vec![WarningCode::ClassExtendsAnnotationNoId]);
}

#[test]
fn test_mixin_factory() {
    let doc = scan(
        r#"
/** @mixinFunction */
export const Selectable = (base) => class extends base {
  static get properties() {
    return { selected: { type: Boolean, notify: true } };
  }
  select() {}
};
"#,
    );
    assert_eq!(doc.features.len(), 1);
    let mixin = &doc.features[0];
    assert_eq!(mixin.kind, EntityKind::Mixin);
    assert_eq!(mixin.name.as_deref(), Some("Selectable"));
    assert!(mixin.superclass.is_none());
    assert!(mixin.properties["selected"].is_published());
    assert!(mixin.methods.contains_key("select"));
}

#[test]
fn test_mixin_function_declaration_applying_another_mixin() {
    let doc = scan(
        r#"
/** @mixinFunction */
function Outer(superClass) {
  return class extends Inner(superClass) {
    outer() {}
  };
}
"#,
    );
    let outer = feature(&doc, "Outer");
    assert_eq!(outer.kind, EntityKind::Mixin);
    assert_eq!(identifiers(&outer.mixins), vec!["Inner"]);
    assert!(outer.superclass.is_none());
    assert!(outer.methods.contains_key("outer"));
}

#[test]
fn test_degenerate_and_invalid_mixins() {
    let doc = scan(
        r#"
/** @mixinFunction */
let Forward;

/** @mixinFunction */
const NotAFactory = 42;
"#,
    );
    let forward = feature(&doc, "Forward");
    assert_eq!(forward.kind, EntityKind::Mixin);
    assert!(forward.properties.is_empty());
    assert!(forward.methods.is_empty());
    assert!(doc.find_feature("NotAFactory").is_none());
    assert_eq!(doc_codes(&doc), vec![WarningCode::InvalidMixinDeclaration]);
}

#[test]
fn test_class_members() {
    let doc = scan(
        r#"
class Widget {
  get label() { return this._label; }
  get value() { return 1; }
  set value(v) {}
  count = 0;
  /**
   * Open it.
   * @param {boolean} force Skip checks.
   * @return {Promise}
   */
  open(force, ...rest) {}
  static create() {}
  static get properties() {
    return {
      /** Shown on top. */
      heading: String,
      full: { type: String, computed: '_full(first, last)' },
      mode: { type: String, value: 'a', reflectToAttribute: true, observer: '_modeChanged' },
      broken: 42,
    };
  }
  static get observers() {
    return ['_sync(heading, mode)', notAString];
  }
  static get observedAttributes() {
    return ['data-x'];
  }
  [Symbol.iterator]() {}
}
"#,
    );
    let w = feature(&doc, "Widget");

    assert!(w.properties["label"].is_read_only());
    assert!(!w.properties["value"].is_read_only());
    assert_eq!(w.properties["count"].default_value.as_deref(), Some("0"));

    let open = &w.methods["open"];
    assert_eq!(open.description, "Open it.");
    assert_eq!(open.params.len(), 2);
    assert_eq!(open.params[0].type_.as_deref(), Some("boolean"));
    assert_eq!(open.params[0].description.as_deref(), Some("Skip checks."));
    assert!(open.params[1].rest);
    assert_eq!(open.return_type.as_deref(), Some("Promise"));
    assert!(w.static_methods.contains_key("create"));
    assert!(!w.methods.contains_key("create"));

    let heading = &w.properties["heading"];
    assert!(heading.is_published());
    assert_eq!(heading.type_.as_deref(), Some("string"));
    assert_eq!(heading.description, "Shown on top.");

    let full = &w.properties["full"];
    assert!(full.is_read_only());
    let computed = full.computed.as_ref().unwrap();
    assert_eq!(computed.method.as_deref(), Some("_full"));
    assert_eq!(computed.dependencies, vec!["first", "last"]);

    let mode = &w.properties["mode"];
    assert_eq!(mode.default_value.as_deref(), Some("'a'"));
    assert_eq!(
        mode.observer.as_ref().and_then(|o| o.method.as_deref()),
        Some("_modeChanged")
    );

    assert_eq!(w.observers.len(), 1);
    assert_eq!(w.observers[0].expression.dependencies, vec!["heading", "mode"]);
    assert!(w.attributes.contains_key("data-x"));

    let codes: Vec<WarningCode> = w.warnings.iter().map(|w| w.code).collect();
    assert_eq!(
        codes,
        vec![
            WarningCode::CantDetermineName,
            WarningCode::InvalidPropertyConfig,
            WarningCode::InvalidObserversBlock,
        ]
    );
}

#[test]
fn test_invalid_properties_block() {
    let doc = scan("class A {\n  static get properties() { return makeProps(); }\n}\n");
    let codes: Vec<WarningCode> = feature(&doc, "A").warnings.iter().map(|w| w.code).collect();
    assert_eq!(codes, vec![WarningCode::InvalidPropertiesBlock]);
}

#[test]
fn test_entity_doc_tags() {
    let doc = scan(
        r#"
/**
 * A dialog.
 * @fires opened Fired when opened.
 * @attr {string} theme The theme.
 * @property {number} size The size.
 * @abstract
 */
class Dialog {}
"#,
    );
    let dialog = feature(&doc, "Dialog");
    assert_eq!(dialog.description, "A dialog.");
    assert!(dialog.is_abstract);
    assert_eq!(dialog.events["opened"].description, "Fired when opened.");
    assert_eq!(dialog.attributes["theme"].type_.as_deref(), Some("string"));
    assert_eq!(dialog.properties["size"].type_.as_deref(), Some("number"));
}

#[test]
fn test_private_by_convention() {
    let doc = scan("class _Hidden {\n  _helper() {}\n  __secret() {}\n}\n");
    let hidden = feature(&doc, "_Hidden");
    assert_eq!(hidden.privacy, Privacy::Protected);
    assert_eq!(hidden.methods["_helper"].privacy, Privacy::Protected);
    assert_eq!(hidden.methods["__secret"].privacy, Privacy::Private);
}

#[test]
fn test_prototype_members_attach_to_their_class() {
    let doc = scan(
        r#"
Foo.prototype.early = function (a, b) {};
class Foo {}
/** @type {string} */
Foo.prototype.label;
Foo.prototype.count = 3;
Foo.prototype.ignored;
Missing.prototype.lost = 1;
"#,
    );
    assert_eq!(doc.features.len(), 1);
    let foo = &doc.features[0];
    assert_eq!(foo.methods["early"].params.len(), 2);
    assert_eq!(foo.properties["label"].type_.as_deref(), Some("string"));
    assert_eq!(foo.properties["count"].default_value.as_deref(), Some("3"));
    assert!(!foo.properties.contains_key("ignored"));
}

#[test]
fn test_behaviors() {
    let doc = scan(
        r#"
/** @polymerBehavior Polymer.IronFoo */
Polymer.IronFooImpl = {
  properties: { active: { type: Boolean, notify: true } },
  listeners: { tap: '_onTap' },
  toggle() {},
};

/** @polymerBehavior */
Polymer.IronBar = [Polymer.IronFooImpl, { extra() {} }];

/** @polymerBehavior */
const Broken = 'nope';
"#,
    );
    let foo = feature(&doc, "Polymer.IronFoo");
    assert_eq!(foo.kind, EntityKind::Behavior);
    assert!(foo.properties["active"].notifies());
    assert!(foo.methods.contains_key("toggle"));
    assert!(!foo.properties.contains_key("listeners"));

    let bar = feature(&doc, "Polymer.IronBar");
    assert_eq!(identifiers(&bar.behaviors), vec!["Polymer.IronFooImpl"]);
    assert!(bar.methods.contains_key("extra"));

    assert_eq!(doc_codes(&doc), vec![WarningCode::InvalidBehaviorDeclaration]);
}

#[test]
fn test_legacy_elements() {
    let doc = scan(
        r#"
var XLegacy = Polymer({
  is: 'x-legacy',
  behaviors: [Polymer.IronFoo],
  properties: { size: Number },
  ready() {},
});
Polymer({ properties: {} });
Polymer(notAnObject);
"#,
    );
    let legacy = feature(&doc, "XLegacy");
    assert_eq!(legacy.kind, EntityKind::Element);
    assert_eq!(legacy.tag_name.as_deref(), Some("x-legacy"));
    assert_eq!(identifiers(&legacy.behaviors), vec!["Polymer.IronFoo"]);
    assert!(legacy.properties["size"].is_published());
    assert!(legacy.methods.contains_key("ready"));

    let anonymous = doc
        .features
        .iter()
        .find(|f| f.name.is_none())
        .unwrap();
    let codes: Vec<WarningCode> = anonymous.warnings.iter().map(|w| w.code).collect();
    assert_eq!(codes, vec![WarningCode::CouldNotDetermineTagName]);
    assert_eq!(doc_codes(&doc), vec![WarningCode::InvalidLegacyElement]);
}

#[test]
fn test_minimal_options_skip_legacy_scanners() {
    let source = r#"
/** @polymerBehavior */
const B = { x() {} };
Polymer({ is: 'x-a' });
class Foo {}
Foo.prototype.bar = 1;
"#;
    let doc = scan_with(source, AnalyzerOptions::minimal());
    assert_eq!(doc.features.len(), 1);
    assert!(doc.features[0].properties.is_empty());
}

#[test]
fn test_global_prefix_is_configurable() {
    let options = AnalyzerOptions::default().with_global_prefixes(["top."]);
    let doc = scan_with("class A extends top.Base {}\nclass B extends window.Base {}\n", options);
    assert_eq!(
        feature(&doc, "A").superclass.as_ref().map(|r| r.identifier.as_str()),
        Some("Base")
    );
    assert_eq!(
        feature(&doc, "B").superclass.as_ref().map(|r| r.identifier.as_str()),
        Some("window.Base")
    );
}

#[test]
fn test_scan_is_deterministic() {
    let source = r#"
/** @mixinFunction */
const M = (b) => class extends b { m() {} };
class El extends M(HTMLElement) {
  static get properties() { return { a: String }; }
}
customElements.define('x-el', El);
customElements.define(bad, El);
"#;
    let first = scan(source);
    let second = scan(source);
    assert_eq!(first.features, second.features);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn test_ranges_are_zero_based() {
    let doc = scan("\n\n  class Foo {}\n");
    let foo = &doc.features[0];
    assert_eq!(foo.range.file, "test.js");
    assert_eq!((foo.range.start.line, foo.range.start.column), (2, 2));
    assert_eq!((foo.range.end.line, foo.range.end.column), (2, 14));
}
