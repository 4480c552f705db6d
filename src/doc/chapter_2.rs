/*!
# The Instruction Alphabet

The compiler turns script lines into statements that the interpreter
executes. The same statements may be sent directly by a remote peer.
Every statement starts with a category letter and a sub-command letter
and ends with a carriage return. A stored program ends with a zero byte.

| Code | Arguments | Meaning |
|------|-----------|---------|
| `CD` | expression | Delay, in tenths of a second. |
| `CL` | label | Declare a jump target. |
| `CJ` | label | Jump. |
| `CC` | label | Jump with probability one half. |
| `CT` | condition `,` label | Jump if true. |
| `CF` | condition `,` label | Jump if false. |
| `RM` | | Store the following statements as the program. |
| `RX` | | End of program; it starts at once. |
| `RA` | | Abandon the program being stored. |
| `RS` | | Start the stored program. |
| `RH` | | Halt. |
| `RP`, `RR` | | Pause and resume. |
| `RC` | | Erase the stored program. |
| `VC` | | Forget all variables. |
| `VS` | name `=` expression | Assign. |
| `VV` | name | Report a variable. |
| `WT` | text | Write text. |
| `WL` | | Write a line break. |
| `WV` | expression | Write a value. |
| `IV` | | Report the version. |
| `IS` | | Report the status. |
| `ID` | expression | Set the diagnostic level, 0 to 3. |
| `#` | anything | Comment. |

Statements with an unknown code are ignored. Control statements (`C`)
are only executed from a stored program.

Labels are the letter `l` followed by a decimal number. A jump searches
the program from the start for the matching `CL`.

```text
while x < 3          CLl0
    println x        CFx<3,l1
                     WVx
                     WL
                     CJl0
                     CLl1
```

*/
