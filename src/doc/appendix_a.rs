/*!
# Error Messages

Errors found while compiling are reported with the program line number
and the source text. Errors found while running are logged and, with a
diagnostic level of one or more, reported to whoever started the program.

| Message | Cause |
|---------|-------|
| `SYNTAX ERROR` | The line could not be understood. |
| `INVALID OPERAND` | An operand is not a number, variable or reading. |
| `MISSING OPERATOR` | An expected `=`, operator or comparison is missing. |
| `OVERFLOW` | A number does not fit in 32 bits. |
| `DIVISION BY ZERO` | |
| `ILLEGAL DIRECT` | A control statement arrived outside a program. |
| `NOT ALLOWED IN PROGRAM` | `run` or `stop` inside `begin` and `end`. |
| `ONLY IN PROGRAM` | A block statement outside `begin` and `end`. |
| `INDENT EXPECTED` | The line after a block opener is not indented deeper. |
| `INDENT NOT ALLOWED` | A line is indented without opening a block. |
| `UNMATCHED INDENT` | A dedent does not line up with an open block. |
| `BLOCK NOT CLOSED` | `end` while a block is still open. |
| `NESTING TOO DEEP` | More than sixteen nested blocks. |
| `END WITHOUT BEGIN` | |
| `PROGRAM HAS ERRORS` | `end` or `run` after a program line failed to compile. |
| `LABEL NOT FOUND` | A jump names a label that is not declared. |
| `UNASSIGNED VARIABLE` | A variable was read before any value was stored. |
| `NO ROOM FOR VARIABLE` | All variable slots are in use. |
| `PROGRAM STORE FULL` | The program does not fit; it is discarded. |
| `NO PROGRAM` | `run` with nothing stored. |

*/
