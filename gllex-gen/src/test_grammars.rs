//! Grammars shared by the tests of several modules.

/// Two derivations of `S` for every `a`.
pub const AMBIGUOUS: &str = "
S : A S | B S | empty ;
A : 'a' ;
B : 'a' ;
";

/// Mutually left-recursive rules.
pub const GSS_CYCLE: &str = "
A : B 'a' | 'a' ;
B : C 'b' | 'b' ;
C : A 'c' | 'c' ;
";

pub const EPSILON_PREFIX: &str = "package \"p\"; S : A 'b' ; A : 'a' | empty ;";

/// `x` reaches `S` through `A` or through the chain `B`, `C`, `D`.
pub const CHAIN: &str = "
S : A | B ;
A : 'x' ;
B : C ;
C : D ;
D : 'x' ;
";

/// `abcd` splits between `X` and `Y` in two ways.
pub const SPLIT: &str = "
S : X Y 'd' ;
X : 'a' | 'a' 'b' ;
Y : 'b' 'c' | 'c' ;
";

/// Left-recursive arithmetic over characters.
pub const EXPR: &str = "
E : E '+' T | T ;
T : T '*' F | F ;
F : '(' E ')' | number ;
";

/// A single lexical rule with an optional prefix.
pub const LEX1: &str = "
Tokens : rule1 Tokens | empty ;
rule1 : [ 'a' ] 'b' ;
";

/// Keywords next to identifiers, with suppressed comments.
pub const KEYWORDS: &str = r#"
package "stmts"

Stmts : Stmt Stmts | empty ;
Stmt : "if" Expr "then" Stmt | id "=" Expr ";" ;
Expr : id | num ;

id : letter { letter | number | '_' } ;
num : < number > ;
!comment : '/' '/' { not "\n" } ;
"#;
