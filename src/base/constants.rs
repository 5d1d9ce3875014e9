//! Domain constants.

/// Extensions of files the project loader picks up.
pub const RUBY_EXTENSIONS: &[&str] = &["rb", "rbi"];

/// Marker of an expected-diagnostic trailing comment: `# error: message`.
pub const ERROR_EXPECTATION_MARKER: &str = "error:";

/// Separator between namespace segments in qualified names.
pub const SCOPE_SEPARATOR: &str = "::";

/// Name of the constructor Ruby calls from `Class#new`.
pub const CONSTRUCTOR: &str = "initialize";

/// Instance methods every object responds to (`BasicObject`, `Object`,
/// `Kernel`). These resolve without a definition and are never
/// arity-checked.
pub const OBJECT_METHODS: &[&str] = &[
    "!", "!=", "==", "===", "=~", "class", "clone", "define_singleton_method", "display",
    "dup", "enum_for", "eql?", "equal?", "extend", "freeze", "frozen?", "hash", "inspect",
    "instance_of?", "instance_variable_defined?", "instance_variable_get",
    "instance_variable_set", "instance_variables", "is_a?", "itself", "kind_of?", "method",
    "methods", "nil?", "object_id", "public_send", "respond_to?", "send", "singleton_class",
    "tap", "then", "to_enum", "to_s",
];

/// Singleton methods every class or module responds to (`Module`, `Class`).
pub const MODULE_METHODS: &[&str] = &[
    "<", "<=", ">", ">=", "alias_method", "allocate", "ancestors", "attr_accessor",
    "attr_reader", "attr_writer", "class_eval", "class_exec", "const_defined?", "const_get",
    "const_set", "constants", "define_method", "include", "include?", "included_modules",
    "instance_method", "instance_methods", "method_defined?", "module_eval", "module_function",
    "name", "private", "private_constant", "protected", "public", "superclass",
];

/// Whether `name` is an always-present instance method.
pub fn is_object_method(name: &str) -> bool {
    OBJECT_METHODS.contains(&name)
}

/// Whether `name` is an always-present singleton method. Singletons are
/// objects too, so this includes [`OBJECT_METHODS`].
pub fn is_module_method(name: &str) -> bool {
    MODULE_METHODS.contains(&name) || is_object_method(name)
}
