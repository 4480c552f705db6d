/*!
# Introductory Tutorial

Begin by opening a terminal and running the executable. Type CTRL-D to
exit. Stop a running program with CTRL-C.

<pre><code>&nbsp;> println "Hello World"
&nbsp;  Hello World
</code></pre>

A line typed at the prompt is compiled and executed at once. Only simple
statements work this way: assignments, `print`, `println`, `clear`,
`run` and `stop`.

<pre><code>&nbsp;> x = 6 * 7
&nbsp;> println x
&nbsp;  42
</code></pre>

Programs are written between `begin` and `end`. The prompt shows how many
blocks are open while a program is being entered. Blocks are opened by
`if`, `while`, `forever` and `do`, and the statements inside a block are
indented deeper than the statement that opened it. A block ends when a
line returns to the indentation of its opener.

<pre><code>&nbsp;> begin
&nbsp;  0| x = 0
&nbsp;  0| while x < 3
&nbsp;  1|     println x
&nbsp;  1|     x = x + 1
&nbsp;  0| end
&nbsp;  0
&nbsp;  1
&nbsp;  2
</code></pre>

A program starts running as soon as `end` is accepted and keeps running
while you type. `stop` halts it and `run` starts it again from the top.
If any line of the program had an error, the program is discarded and
`end` reports `PROGRAM HAS ERRORS`.

Use `--store FILE` to keep the program in a file between sessions and
`--diagnostics N` to choose how chatty the interpreter is about errors
and state changes.

*/
