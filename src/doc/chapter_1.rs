/*!
# The Script Language

## Lines and indentation

Every line holds one statement. Leading spaces are significant inside a
program and nowhere else. A line starting with `#` is a comment. Keywords
are not case sensitive; variable names are.

## Values

All values are signed 32-bit integers. An operand is a decimal literal,
a variable name, or a host reading written `@name`. An expression is an
operand, or two operands joined by one of `+ - * / %`. There is no
precedence and no parentheses. Arithmetic that overflows or divides by
zero stops the statement with an error.

A condition is two operands, not expressions, joined by one of
`== != < <= > >=`.

## Statements

| Statement | Effect |
|-----------|--------|
| `set x = e` or `x = e` | Assign. The variable is created when first assigned. |
| `print "text"`, `print e` | Write text or a value. |
| `println ...` | The same, followed by a line break. `println` alone writes a line break. |
| `delay e` | Wait `e` tenths of a second. |
| `wait n` | Wait `n` seconds. |
| `clear` | Forget all variables. |
| `run`, `stop` | Start or halt the stored program. Not allowed in a program. |
| `begin`, `end` | Bracket a program. A second `begin` starts the program over. |
| `* text` | Pass `text` through as a raw statement. Inside a program, remote (`R`) statements are not allowed. |

## Blocks

Only allowed inside a program.

| Opener | Closer | |
|--------|--------|---|
| `if c` | dedent or `endif` | May contain one `else` at the same indentation as the `if`. |
| `while c` | dedent or `endwhile` | Tests `c` before every pass. |
| `forever` | dedent or `endwhile` | Loops until `break`. |
| `do` | `until c` or `forever` | Tests `c` after every pass; `forever` makes it endless. |

`break` leaves the innermost loop and `continue` starts its next pass.
Blocks nest at most sixteen deep.

```text
begin
    n = 0
    do
        n = n + 1
        r = n % 2
        if r == 0
            println n
    until n >= 6
end
```

*/
