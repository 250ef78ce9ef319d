//! The fixed C runtime every translated program links against
//! (`spec.md` §6): three standard includes, the five runtime helper
//! prototypes, and their definitions. None of this text is spec-dependent;
//! it is copied verbatim (by the original compiler's `c_include`,
//! `c_prototype` and `c_helper`) into every `.c` file it produces.

/// `#include`s, emitted before anything else in the output file.
pub const PRELUDE: &str = "#include <stdio.h>\n#include <stdlib.h>\n#include <string.h>\n\n";

/// Forward declarations for the five runtime helpers, so translated code
/// can call them regardless of where their definitions end up in the file.
pub const PROTOTYPES: &str = "char* concat(char* str1, char* str2);\nchar* itos(int x);\nchar* ctos(char c);\n\nchar* read_file(char* path);\nvoid write_file(char* path, char* content);\n\n";

/// Definitions of the five runtime helpers, emitted after the translated
/// program (`spec.md` §6.2's external collaborator, reproduced here since
/// this driver is the compiler's only caller).
pub const HELPERS: &str = r#"
char* concat(char* str1, char* str2) {
static char buf[1024];
snprintf(buf, sizeof(buf), "%s%s", str1, str2);
return buf;
}

char* itos(int x) {
static char buf[32];
snprintf(buf, sizeof(buf), "%d", x);
return buf;
}

char* ctos(char c) {
static char buf[2];
buf[0] = c;
buf[1] = '\0';
return buf;
}

char* read_file(char* path) {
FILE* f = fopen(path, "rb");
if (!f) return NULL;
fseek(f, 0, SEEK_END);
long len = ftell(f);
fseek(f, 0, SEEK_SET);
char* buf = malloc(len + 1);
fread(buf, 1, len, f);
buf[len] = '\0';
fclose(f);
return buf;
}

void write_file(char* path, char* content) {
FILE* f = fopen(path, "w");
if (!f) return;
fprintf(f, "%s", content);
fclose(f);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_includes_the_three_standard_headers() {
        assert!(PRELUDE.contains("#include <stdio.h>"));
        assert!(PRELUDE.contains("#include <stdlib.h>"));
        assert!(PRELUDE.contains("#include <string.h>"));
    }

    #[test]
    fn prototypes_cover_every_runtime_helper() {
        for name in ["concat", "itos", "ctos", "read_file", "write_file"] {
            assert!(PROTOTYPES.contains(name), "missing prototype for {name}");
        }
    }

    #[test]
    fn helpers_define_every_prototyped_function() {
        for sig in [
            "char* concat(char* str1, char* str2) {",
            "char* itos(int x) {",
            "char* ctos(char c) {",
            "char* read_file(char* path) {",
            "void write_file(char* path, char* content) {",
        ] {
            assert!(HELPERS.contains(sig), "missing definition for {sig}");
        }
    }
}
